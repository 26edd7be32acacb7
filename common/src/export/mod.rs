//! 파일 출력 (xlsx)

#[cfg(feature = "excel")]
pub mod excel_core;

#[cfg(feature = "excel")]
pub mod patch;
