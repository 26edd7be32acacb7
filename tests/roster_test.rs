//! 계정 목록 파일 읽기 테스트

use daily_sales::error::SalesError;
use daily_sales::roster::read_roster;
use daily_sales::workbook::save_workbook;
use daily_sales_common::{CellValue, Grid, Workbook};
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_read_roster_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("data.xlsx");

    let mut sheet = Grid::new("계정정보");
    sheet.append(["업체명", "링크", "아이디", "비밀번호"]);
    sheet.append(["Acme", "https://acme.example/admin", "acme", "secret"]);
    sheet.append(["Beta", "", "beta", "x"]);
    sheet.set(4, 1, "Gamma").unwrap();
    sheet.set(4, 2, "https://gamma.example/admin").unwrap();
    sheet.set(4, 3, "gamma").unwrap();
    sheet.set(4, 4, CellValue::Int(1234)).unwrap();
    save_workbook(&Workbook::with_sheet(sheet), &path).unwrap();

    let entries = read_roster(&path, "계정정보").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].stem, "Acme");
    assert_eq!(entries[1].stem, "Gamma");
    assert_eq!(entries[1].password, "1234");
}

#[test]
fn test_missing_roster_file_is_roster_error() {
    let result = read_roster(Path::new("/nonexistent/data.xlsx"), "계정정보");
    assert!(matches!(result, Err(SalesError::Roster(_))));
}

#[test]
fn test_missing_roster_sheet_is_roster_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("data.xlsx");
    save_workbook(&Workbook::with_sheet(Grid::new("Sheet1")), &path).unwrap();

    let result = read_roster(&path, "계정정보");
    assert!(matches!(result, Err(SalesError::Roster(_))));
}
