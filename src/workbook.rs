//! xlsx 파일 ↔ 격자 변환
//!
//! 읽기는 calamine, 새 파일 쓰기는 common::export::excel_core (rust_xlsxwriter),
//! 기존 파일 수정은 common::export::patch.

use crate::error::{Result, SalesError};
use calamine::{open_workbook_auto, Data, Reader};
use daily_sales_common::export::excel_core;
use daily_sales_common::export::patch::{self, SheetPatch};
use daily_sales_common::{CellValue, Grid, Workbook};
use std::path::Path;
use tracing::debug;

pub fn data_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(v) => CellValue::Int(*v),
        Data::Float(v) => CellValue::Float(*v),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// 파일의 모든 시트를 값과 수식 그대로 읽는다
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    if !path.exists() {
        return Err(SalesError::FileNotFound(path.display().to_string()));
    }

    let mut source = open_workbook_auto(path)
        .map_err(|e| SalesError::Workbook(format!("{}: {}", path.display(), e)))?;
    let mut book = Workbook::new();

    for name in source.sheet_names() {
        let mut grid = Grid::new(name.as_str());

        let range = source
            .worksheet_range(&name)
            .map_err(|e| SalesError::Workbook(format!("{} [{}]: {}", path.display(), name, e)))?;
        if let Some((row0, col0)) = range.start() {
            for (r, c, cell) in range.used_cells() {
                let value = data_to_value(cell);
                if value == CellValue::Empty {
                    continue;
                }
                grid.set(row0 + r as u32 + 1, col0 + c as u32 + 1, value)?;
            }
        }

        // 수식은 계산된 값 대신 수식으로 보존
        match source.worksheet_formula(&name) {
            Ok(formulas) => {
                if let Some((row0, col0)) = formulas.start() {
                    for (r, c, formula) in formulas.used_cells() {
                        if formula.is_empty() {
                            continue;
                        }
                        grid.set(
                            row0 + r as u32 + 1,
                            col0 + c as u32 + 1,
                            CellValue::Formula(formula.clone()),
                        )?;
                    }
                }
            }
            Err(e) => debug!(sheet = %name, error = %e, "수식 읽기 생략"),
        }

        book.add_sheet(grid)?;
    }

    Ok(book)
}

/// 이름으로 시트 1장을 읽는다
pub fn load_sheet(path: &Path, sheet: &str) -> Result<Grid> {
    let book = load_workbook(path)?;
    book.sheets()
        .iter()
        .find(|g| g.name() == sheet)
        .cloned()
        .ok_or_else(|| SalesError::SheetNotFound(format!("{} [{}]", path.display(), sheet)))
}

/// 첫 번째 시트를 읽는다
pub fn load_active_sheet(path: &Path) -> Result<Grid> {
    let book = load_workbook(path)?;
    book.active()
        .cloned()
        .ok_or_else(|| SalesError::SheetNotFound(format!("{} (시트 없음)", path.display())))
}

pub fn save_workbook(book: &Workbook, path: &Path) -> Result<()> {
    excel_core::save_workbook(book, path)
        .map_err(|e| SalesError::ExcelGeneration(format!("{}: {}", path.display(), e)))
}

/// `src` 의 한 시트에 셀 변경만 적용해 `dst` 에 쓴다. 서식, 병합 셀, 열 너비는 그대로
pub fn patch_workbook_file(src: &Path, dst: &Path, sheet: &str, changes: &SheetPatch) -> Result<()> {
    patch::patch_file(src, dst, sheet, changes)
        .map_err(|e| SalesError::ExcelGeneration(format!("{}: {}", dst.display(), e)))?;
    debug!(path = %dst.display(), sheet, cells = changes.len(), "셀 변경 적용");
    Ok(())
}
