//! 격자 → xlsx 변환 (공통 라이브러리)
//!
//! grid.rs 의 Workbook 을 rust_xlsxwriter 로 직렬화한다.

use crate::error::{Error, Result};
use crate::grid::{Cell, CellValue, Workbook};
use rust_xlsxwriter::{
    ColNum, Color, Format, FormatPattern, Formula, RowNum, Workbook as XlsxWorkbook, Worksheet,
};
use std::collections::HashMap;
use std::path::Path;

const MAX_ROWS: u32 = 1_048_576;
const MAX_COLS: u32 = 16_384;
const DATE_NUM_FORMAT: &str = "yyyy-mm-dd";

/// 셀 서식 키: (채우기, 날짜 여부)
type FormatKey = (Option<u32>, bool);

fn cell_format_key(cell: &Cell) -> Option<FormatKey> {
    let is_date = matches!(cell.value, CellValue::DateTime(_));
    if cell.fill.is_none() && !is_date {
        return None;
    }
    Some((cell.fill.map(|f| f.0), is_date))
}

fn build_format((fill, is_date): FormatKey) -> Format {
    let mut format = Format::new();
    if let Some(rgb) = fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(rgb));
    }
    if is_date {
        format = format.set_num_format(DATE_NUM_FORMAT);
    }
    format
}

/// 1부터 시작하는 좌표를 0부터 시작하는 xlsx 좌표로
fn to_xlsx_coord(row: u32, col: u32) -> Result<(RowNum, ColNum)> {
    if row == 0 || row > MAX_ROWS || col == 0 || col > MAX_COLS {
        return Err(Error::Excel(format!("셀 좌표 범위 초과: ({}, {})", row, col)));
    }
    Ok((row - 1, (col - 1) as ColNum))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    cell: &Cell,
    format: Option<&Format>,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    match (&cell.value, format) {
        (CellValue::Empty, Some(f)) => {
            worksheet.write_blank(row, col, f)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Text(s), Some(f)) => {
            worksheet.write_string_with_format(row, col, s, f)?;
        }
        (CellValue::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (CellValue::Int(v), Some(f)) => {
            worksheet.write_number_with_format(row, col, *v as f64, f)?;
        }
        (CellValue::Int(v), None) => {
            worksheet.write_number(row, col, *v as f64)?;
        }
        (CellValue::Float(v), Some(f)) => {
            worksheet.write_number_with_format(row, col, *v, f)?;
        }
        (CellValue::Float(v), None) => {
            worksheet.write_number(row, col, *v)?;
        }
        (CellValue::DateTime(v), Some(f)) => {
            worksheet.write_number_with_format(row, col, *v, f)?;
        }
        (CellValue::DateTime(v), None) => {
            worksheet.write_number(row, col, *v)?;
        }
        (CellValue::Bool(b), Some(f)) => {
            worksheet.write_boolean_with_format(row, col, *b, f)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Formula(text), Some(f)) => {
            worksheet.write_formula_with_format(row, col, Formula::new(text), f)?;
        }
        (CellValue::Formula(text), None) => {
            worksheet.write_formula(row, col, Formula::new(text))?;
        }
    }
    Ok(())
}

/// Workbook 을 xlsx 바이트로 생성
pub fn workbook_to_buffer(book: &Workbook) -> Result<Vec<u8>> {
    let mut xlsx = XlsxWorkbook::new();
    let mut formats: HashMap<FormatKey, Format> = HashMap::new();

    for sheet in book.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet
            .set_name(sheet.name())
            .map_err(|e| Error::Excel(format!("시트 이름 설정 오류 ({}): {}", sheet.name(), e)))?;

        for ((row, col), cell) in sheet.cells() {
            let (x_row, x_col) = to_xlsx_coord(row, col)?;
            let format = match cell_format_key(cell) {
                Some(key) => Some(&*formats.entry(key).or_insert_with(|| build_format(key))),
                None => None,
            };
            write_cell(worksheet, x_row, x_col, cell, format)
                .map_err(|e| Error::Excel(format!("셀 쓰기 오류 ({}, {}): {}", row, col, e)))?;
        }
    }

    xlsx.save_to_buffer()
        .map_err(|e| Error::Excel(format!("Excel 저장 오류: {}", e)))
}

/// Workbook 을 파일로 저장 (같은 이름의 파일은 덮어쓴다)
pub fn save_workbook(book: &Workbook, path: &Path) -> Result<()> {
    let buffer = workbook_to_buffer(book)?;
    std::fs::write(path, buffer)?;
    Ok(())
}
