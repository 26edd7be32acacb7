//! 마스터 파일에 일일 메모 추가
//!
//! 지정한 시트의 마지막 행 다음 행, 지정 열(기본 AY)에 텍스트를 쓴다.

use crate::error::{Result, SalesError};
use crate::workbook::{load_sheet, patch_workbook_file};
use daily_sales_common::export::patch::SheetPatch;
use std::path::Path;
use tracing::info;

/// 기록한 행 번호를 반환. 마스터 파일이 없으면 새로 만들지 않고 오류
pub fn append_note(master_path: &Path, sheet: &str, column: u32, text: &str) -> Result<u32> {
    if !master_path.exists() {
        return Err(SalesError::FileNotFound(master_path.display().to_string()));
    }

    let grid = load_sheet(master_path, sheet)?;
    let row = grid.max_row() + 1;

    let mut changes = SheetPatch::new();
    changes.set(row, column, text)?;
    patch_workbook_file(master_path, master_path, sheet, &changes)?;
    info!(path = %master_path.display(), row, column, "메모 추가");

    Ok(row)
}
