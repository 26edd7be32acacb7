//! 가구사 일일매출 수집 도구
//!
//! 업체별 관리자 대시보드에서 주문/에누리/견적 목록을 읽어
//! 업체별 엑셀과 일일매출 마스터 엑셀을 만든다.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod merge;
pub mod note;
pub mod pipeline;
pub mod portal;
pub mod report;
pub mod roster;
pub mod workbook;
