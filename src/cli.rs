use crate::config::MergeSchedule;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daily-sales")]
#[command(about = "가구사 대시보드 수집 · 일일매출 템플릿 병합 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 상대 경로의 기준 폴더 (기본: 현재 폴더)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 계정 목록의 모든 업체를 수집하고 마스터 파일 생성
    Run {
        /// 병합 시점 (each_company/once)
        #[arg(long)]
        merge_schedule: Option<MergeSchedule>,

        /// 저장된 HTML 폴더에서 읽기 (<파일명>.html, 로그인 생략)
        #[arg(long)]
        pages: Option<PathBuf>,

        /// 실행 날짜 (YYYYMMDD, 기본: 오늘)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// 저장된 대시보드 HTML 1개로 업체별 파일 생성
    Build {
        /// 대시보드 HTML 파일
        #[arg(long, required = true)]
        html: PathBuf,

        /// 업체명 (결과 파일명)
        #[arg(long, required = true)]
        company: String,
    },

    /// 결과 폴더의 업체별 파일을 마스터 파일로 병합
    Merge {
        /// 실행 날짜 (YYYYMMDD, 기본: 오늘)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// 마스터 파일에 메모 추가
    Note {
        /// 기록할 텍스트
        #[arg(long, required = true)]
        text: String,

        /// 대상 마스터 파일 날짜 (YYYYMMDD, 기본: 오늘)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// 설정 표시/초기화
    Config {
        /// 설정 표시
        #[arg(long)]
        show: bool,

        /// 기본 설정 파일 저장
        #[arg(long)]
        init: bool,
    },
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| format!("Invalid date: {} ({}). Use YYYYMMDD", s, e))
}
