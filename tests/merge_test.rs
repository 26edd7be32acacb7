//! 마스터 병합 통합 테스트
//!
//! 실제 xlsx 파일을 쓰고 다시 읽어 병합 결과를 검증

use chrono::NaiveDate;
use daily_sales::error::SalesError;
use daily_sales::merge::{merge_into_master, MergeConfig};
use daily_sales::report::write_company_report;
use daily_sales::workbook::{load_sheet, save_workbook};
use calamine::{open_workbook_auto, Data, Reader};
use daily_sales_common::{CellValue, ExtractedDataset, Grid, RawRow, Workbook};
use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatPattern};
use std::io::Read;
use std::path::Path;
use tempfile::tempdir;

const MASTER_SHEET: &str = "평일";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// A열에 업체명이 있는 템플릿
fn write_template(path: &Path, companies: &[(u32, &str)]) {
    let mut master = Grid::new(MASTER_SHEET);
    master.set(1, 1, "업체명").unwrap();
    master.set(1, 18, "결제").unwrap();
    for (row, name) in companies {
        master.set(*row, 1, *name).unwrap();
    }
    master.set(2, 2, CellValue::Formula("SUM(R2:AX2)".into())).unwrap();

    let mut book = Workbook::new();
    book.add_sheet(master).unwrap();
    book.add_sheet(Grid::new("주말")).unwrap();
    save_workbook(&book, path).unwrap();
}

fn write_grid(path: &Path, grid: Grid) {
    save_workbook(&Workbook::with_sheet(grid), path).unwrap();
}

fn merge_config(output_dir: &Path, template: &Path) -> MergeConfig {
    MergeConfig {
        output_dir: output_dir.to_path_buf(),
        template_path: template.to_path_buf(),
        master_sheet: MASTER_SHEET.to_string(),
        date: run_date(),
    }
}

fn int_at(grid: &Grid, row: u32, col: u32) -> Option<i64> {
    grid.get(row, col).and_then(CellValue::as_i64)
}

/// 표식 아래 결제금액 2건이 R, S열에 들어가는지
#[test]
fn test_order_series_written_to_r_band() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_dir = dir.path().join("result");
    std::fs::create_dir_all(&output_dir).unwrap();
    let template = dir.path().join("가구사_일일매출_템플릿.xlsx");
    write_template(&template, &[(5, "Acme")]);

    let mut sheet = Grid::new("Data");
    sheet.append(["주문정보", "주문접수일", "배송방법", "주문자/입금자", "회원구분", "결제금액"]);
    sheet.append(["x", "x", "x", "x", "x", "1,000원"]);
    sheet.append(["x", "x", "x", "x", "x", "2,500원"]);
    sheet.append(Vec::<String>::new());
    write_grid(&output_dir.join("Acme.xlsx"), sheet);

    let report = merge_into_master(&merge_config(&output_dir, &template)).unwrap();
    assert_eq!(
        report.master_path.file_name().unwrap().to_string_lossy(),
        "가구사_일일매출_20261018.xlsx"
    );
    assert_eq!(report.merged, vec!["Acme".to_string()]);

    let master = load_sheet(&report.master_path, MASTER_SHEET).unwrap();
    assert_eq!(int_at(&master, 5, 18), Some(1000));
    assert_eq!(int_at(&master, 5, 19), Some(2500));
    assert_eq!(master.get(5, 20), None);
}

/// 업체별 리포트 → 병합: 에누리 뒤에 견적이 이어진다
#[test]
fn test_report_to_master_bands() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_dir = dir.path().join("result");
    std::fs::create_dir_all(&output_dir).unwrap();
    let template = dir.path().join("가구사_일일매출_템플릿.xlsx");
    write_template(&template, &[(3, "Beta"), (4, "Acme")]);

    let dataset = ExtractedDataset {
        order_rows: vec![RawRow::new(["김철수[VIP]", "10-18", "택배", "김철수", "회원", "₩12,345원", "입금", "카드"])],
        discount_rows: vec![
            RawRow::new(["김철수[일반]", "1,000원", "010", "상담원"]),
            RawRow::new(["이영희", "2,000원", "010", "상담원"]),
        ],
        estimate_rows: vec![RawRow::new(["박민수", "30,000원", "010", "상담원"])],
        ..Default::default()
    };
    write_company_report(&dataset, "Acme", &output_dir).unwrap();

    let report = merge_into_master(&merge_config(&output_dir, &template)).unwrap();
    let master = load_sheet(&report.master_path, MASTER_SHEET).unwrap();

    assert_eq!(int_at(&master, 4, 18), Some(12345));
    assert_eq!(int_at(&master, 4, 52), Some(1000));
    assert_eq!(int_at(&master, 4, 53), Some(2000));
    assert_eq!(int_at(&master, 4, 54), Some(30000));
    assert_eq!(master.get(4, 55), None);
    // 다른 업체 행은 그대로
    assert_eq!(master.get(3, 18), None);
}

/// 마스터에 없는 업체는 조용히 건너뛴다
#[test]
fn test_unmatched_company_leaves_rows_unchanged() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_dir = dir.path().join("result");
    std::fs::create_dir_all(&output_dir).unwrap();
    let template = dir.path().join("template.xlsx");
    write_template(&template, &[(2, "Acme")]);

    let mut sheet = Grid::new("Data");
    sheet.append(["결제금액"]);
    write_grid(&output_dir.join("Unknown.xlsx"), sheet);

    let report = merge_into_master(&merge_config(&output_dir, &template)).unwrap();
    assert!(report.merged.is_empty());
    assert_eq!(report.unmatched, vec!["Unknown".to_string()]);

    let before = load_sheet(&template, MASTER_SHEET).unwrap();
    let after = load_sheet(&report.master_path, MASTER_SHEET).unwrap();
    assert_eq!(before, after);
}

/// 이전 실행의 마스터 파일은 다시 병합하지 않고, 두 번 실행해도 결과가 같다
#[test]
fn test_merge_is_repeatable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_dir = dir.path().join("result");
    std::fs::create_dir_all(&output_dir).unwrap();
    let template = dir.path().join("가구사_일일매출_템플릿.xlsx");
    write_template(&template, &[(2, "Acme"), (3, "가구사_일일매출_20261018")]);

    let dataset = ExtractedDataset {
        discount_rows: vec![RawRow::new(["a", "700원"])],
        ..Default::default()
    };
    write_company_report(&dataset, "Acme", &output_dir).unwrap();

    let config = merge_config(&output_dir, &template);
    let first = merge_into_master(&config).unwrap();
    let first_sheet = load_sheet(&first.master_path, MASTER_SHEET).unwrap();
    let second = merge_into_master(&config).unwrap();
    let second_sheet = load_sheet(&second.master_path, MASTER_SHEET).unwrap();

    assert_eq!(second.merged, vec!["Acme".to_string()]);
    assert_eq!(first_sheet, second_sheet);
    assert_eq!(int_at(&second_sheet, 2, 52), Some(700));
    assert_eq!(second_sheet.get(3, 52), None);
}

/// 템플릿의 다른 시트와 수식이 보존된다
#[test]
fn test_template_sheets_and_formulas_preserved() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = dir.path().join("template.xlsx");
    write_template(&template, &[(2, "Acme")]);

    let report = merge_into_master(&merge_config(dir.path(), &template)).unwrap();
    let master = load_sheet(&report.master_path, MASTER_SHEET).unwrap();
    assert_eq!(master.get(2, 2), Some(&CellValue::Formula("SUM(R2:AX2)".into())));
    assert!(load_sheet(&report.master_path, "주말").is_ok());
}

/// 서식이 있는 템플릿: B1 날짜, A2 빨간 배경, 병합 셀, 열 너비
fn write_styled_template(path: &Path) {
    let mut book = rust_xlsxwriter::Workbook::new();
    let sheet = book.add_worksheet();
    sheet.set_name(MASTER_SHEET).unwrap();

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let fill = Format::new()
        .set_background_color(Color::Red)
        .set_pattern(FormatPattern::Solid);
    let date = ExcelDateTime::from_ymd(2026, 10, 18).unwrap();

    sheet.write_string(0, 0, "업체명").unwrap();
    sheet.write_datetime_with_format(0, 1, &date, &date_format).unwrap();
    sheet.write_string_with_format(1, 0, "Acme", &fill).unwrap();
    sheet.merge_range(0, 2, 0, 5, "합계", &Format::new()).unwrap();
    sheet.set_column_width(0, 24).unwrap();
    book.save(path).unwrap();
}

/// xlsx 파일 안의 파트 1개
fn read_part(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut text = String::new();
    part.read_to_string(&mut text).unwrap();
    text
}

/// `<c r="A2" ...>` 시작 태그
fn cell_tag<'a>(sheet_xml: &'a str, reference: &str) -> &'a str {
    let start = sheet_xml.find(&format!(r#"<c r="{}""#, reference)).unwrap();
    let end = start + sheet_xml[start..].find('>').unwrap();
    &sheet_xml[start..=end]
}

/// 병합해도 템플릿의 날짜, 채우기, 병합 셀, 열 너비가 남는다
#[test]
fn test_template_formatting_survives_merge() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_dir = dir.path().join("result");
    std::fs::create_dir_all(&output_dir).unwrap();
    let template = dir.path().join("가구사_일일매출_템플릿.xlsx");
    write_styled_template(&template);

    let mut sheet = Grid::new("Data");
    sheet.append(["결제금액"]);
    sheet.append(["1,000원"]);
    sheet.append(["2,500원"]);
    write_grid(&output_dir.join("Acme.xlsx"), sheet);

    let report = merge_into_master(&merge_config(&output_dir, &template)).unwrap();
    assert_eq!(report.merged, vec!["Acme".to_string()]);

    // 날짜 셀은 날짜로 남는다
    let mut master_book = open_workbook_auto(&report.master_path).unwrap();
    let range = master_book.worksheet_range(MASTER_SHEET).unwrap();
    assert!(matches!(range.get_value((0, 1)), Some(Data::DateTime(_))));

    let master = load_sheet(&report.master_path, MASTER_SHEET).unwrap();
    assert_eq!(int_at(&master, 2, 18), Some(1000));
    assert_eq!(int_at(&master, 2, 19), Some(2500));
    assert_eq!(master.get(2, 1), Some(&CellValue::from("Acme")));

    let sheet_part = "xl/worksheets/sheet1.xml";
    let template_xml = read_part(&template, sheet_part);
    let master_xml = read_part(&report.master_path, sheet_part);
    assert_eq!(cell_tag(&master_xml, "A2"), cell_tag(&template_xml, "A2"));
    assert_eq!(cell_tag(&master_xml, "B1"), cell_tag(&template_xml, "B1"));
    assert!(master_xml.contains(r#"<mergeCell ref="C1:F1"/>"#));
    assert!(master_xml.contains("<cols>"));
    assert_eq!(
        read_part(&report.master_path, "xl/styles.xml"),
        read_part(&template, "xl/styles.xml")
    );
}

/// 템플릿에 평일 시트가 없으면 오류
#[test]
fn test_missing_master_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = dir.path().join("template.xlsx");
    write_grid(&template, Grid::new("Sheet1"));

    let result = merge_into_master(&merge_config(dir.path(), &template));
    assert!(matches!(result, Err(SalesError::SheetNotFound(_))));
}

/// 템플릿 파일이 없으면 오류
#[test]
fn test_missing_template() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = merge_into_master(&merge_config(dir.path(), &dir.path().join("none.xlsx")));
    assert!(matches!(result, Err(SalesError::FileNotFound(_))));
}
