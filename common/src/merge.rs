//! 템플릿 병합 엔진 (순수 격자 연산)
//!
//! 업체별 시트에서 표식 라벨(`결제금액` 등)을 찾아 그 아래 숫자 열을 읽고,
//! 마스터 시트의 업체 행 고정 열 구간에 기록한다.
//!
//! 1단계 `locate_series`: 표식 위치와 값 범위를 찾는다.
//! 2단계 `extract_series`: 범위의 값을 정수로 변환한다.

use crate::error::Result;
use crate::grid::{CellValue, Grid};
use crate::normalize::parse_amount;
use std::ops::RangeInclusive;

/// R열
pub const ORDER_BAND_START: u32 = 18;
/// AZ열
pub const DISCOUNT_BAND_START: u32 = 52;

/// 표식 라벨과 값을 읽을 열
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    pub marker: &'static str,
    pub value_col: u32,
}

pub const ORDER_SERIES: SeriesSpec = SeriesSpec { marker: "결제금액", value_col: 6 };
pub const DISCOUNT_SERIES: SeriesSpec = SeriesSpec { marker: "요청금액", value_col: 2 };
pub const ESTIMATE_SERIES: SeriesSpec = SeriesSpec { marker: "총금액", value_col: 2 };

/// 시리즈 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSpan {
    /// 표식이 있는 행
    pub marker_row: u32,
    pub value_col: u32,
    /// 값이 있는 행 범위. 값이 하나도 없으면 None
    pub rows: Option<RangeInclusive<u32>>,
}

impl SeriesSpan {
    pub fn len(&self) -> usize {
        self.rows
            .as_ref()
            .map(|r| (r.end() - r.start() + 1) as usize)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_none()
    }
}

/// 시리즈 종료 조건: 셀이 없거나 비어 있으면 끝
///
/// 중간에 값이 빈 행도 여기서 끝난 것으로 본다.
pub fn is_series_end(cell: Option<&CellValue>) -> bool {
    cell.map_or(true, CellValue::is_blank)
}

/// 위에서부터 모든 열을 훑어 라벨과 정확히 같은 셀이 있는 첫 행
pub fn locate_marker(sheet: &Grid, marker: &str) -> Option<u32> {
    sheet
        .cells()
        .find(|(_, cell)| cell.value.as_text() == Some(marker))
        .map(|((row, _), _)| row)
}

pub fn locate_series(sheet: &Grid, spec: SeriesSpec) -> Option<SeriesSpan> {
    let marker_row = locate_marker(sheet, spec.marker)?;
    let first = marker_row + 1;
    let mut last = None;
    let mut row = first;
    while row <= sheet.max_row() && !is_series_end(sheet.get(row, spec.value_col)) {
        last = Some(row);
        row += 1;
    }

    Some(SeriesSpan {
        marker_row,
        value_col: spec.value_col,
        rows: last.map(|end| first..=end),
    })
}

/// 범위의 셀 값을 금액 정수로 변환
pub fn read_series(sheet: &Grid, span: &SeriesSpan) -> Vec<i64> {
    let Some(rows) = span.rows.clone() else {
        return Vec::new();
    };
    rows.map(|row| {
        sheet
            .get(row, span.value_col)
            .map(|v| parse_amount(&v.to_display_string()))
            .unwrap_or(0)
    })
    .collect()
}

/// 표식이 없으면 None, 표식은 있지만 값이 없으면 빈 Vec
pub fn extract_series(sheet: &Grid, spec: SeriesSpec) -> Option<Vec<i64>> {
    locate_series(sheet, spec).map(|span| read_series(sheet, &span))
}

/// A열을 위에서부터 훑어 업체명과 정확히 같은 첫 행
pub fn find_company_row(master: &Grid, company: &str) -> Option<u32> {
    (1..=master.max_row()).find(|&row| {
        master.get(row, 1).and_then(CellValue::as_text) == Some(company)
    })
}

/// 한 행에 값을 start 열부터 차례로 기록하고 다음 열을 반환
pub fn write_band(master: &mut Grid, row: u32, start: u32, values: &[i64]) -> Result<u32> {
    let mut col = start;
    for &value in values {
        master.set(row, col, value)?;
        col += 1;
    }
    Ok(col)
}

/// 업체 1곳 병합 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldOutcome {
    pub master_row: u32,
    /// 표식이 없던 시리즈는 None
    pub orders: Option<usize>,
    pub discounts: Option<usize>,
    pub estimates: Option<usize>,
}

/// 업체 시트 1장을 마스터 시트에 병합
///
/// 마스터에 업체 행이 없으면 아무것도 쓰지 않고 None.
pub fn fold_company(master: &mut Grid, company: &str, sheet: &Grid) -> Result<Option<FoldOutcome>> {
    let Some(master_row) = find_company_row(master, company) else {
        return Ok(None);
    };
    let mut outcome = FoldOutcome { master_row, ..Default::default() };

    if let Some(values) = extract_series(sheet, ORDER_SERIES) {
        write_band(master, master_row, ORDER_BAND_START, &values)?;
        outcome.orders = Some(values.len());
    }

    // 견적 구간은 에누리 값이 끝난 바로 다음 열에서 시작
    let mut next_col = DISCOUNT_BAND_START;
    if let Some(values) = extract_series(sheet, DISCOUNT_SERIES) {
        next_col = write_band(master, master_row, DISCOUNT_BAND_START, &values)?;
        outcome.discounts = Some(values.len());
    }

    if let Some(values) = extract_series(sheet, ESTIMATE_SERIES) {
        write_band(master, master_row, next_col, &values)?;
        outcome.estimates = Some(values.len());
    }

    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::build_company_sheet;
    use crate::types::{ExtractedDataset, RawRow};

    fn master_with(rows: &[(u32, &str)]) -> Grid {
        let mut master = Grid::new("평일");
        master.set(1, 1, "업체명").unwrap();
        for (row, name) in rows {
            master.set(*row, 1, *name).unwrap();
        }
        master
    }

    fn order_sheet(amounts: &[&str]) -> Grid {
        let mut sheet = Grid::new("Data");
        sheet.append(["주문정보", "x", "x", "x", "x", "결제금액"]);
        for amount in amounts {
            sheet.append(["x", "x", "x", "x", "x", *amount]);
        }
        sheet.append(Vec::<String>::new());
        sheet
    }

    #[test]
    fn test_series_end_predicate() {
        assert!(is_series_end(None));
        assert!(is_series_end(Some(&CellValue::Empty)));
        assert!(is_series_end(Some(&CellValue::from(""))));
        assert!(!is_series_end(Some(&CellValue::from("0원"))));
        assert!(!is_series_end(Some(&CellValue::Int(0))));
    }

    #[test]
    fn test_locate_marker_first_match() {
        let mut sheet = Grid::new("Data");
        sheet.set(3, 4, "총금액").unwrap();
        sheet.set(7, 2, "총금액").unwrap();
        assert_eq!(locate_marker(&sheet, "총금액"), Some(3));
        assert_eq!(locate_marker(&sheet, "요청금액"), None);
    }

    #[test]
    fn test_locate_marker_is_exact() {
        let mut sheet = Grid::new("Data");
        sheet.set(1, 1, "결제금액 합계").unwrap();
        sheet.set(2, 1, " 결제금액").unwrap();
        assert_eq!(locate_marker(&sheet, "결제금액"), None);
    }

    #[test]
    fn test_locate_series_span() {
        let sheet = order_sheet(&["1,000원", "2,500원"]);
        let span = locate_series(&sheet, ORDER_SERIES).unwrap();
        assert_eq!(span.marker_row, 1);
        assert_eq!(span.rows, Some(2..=3));
        assert_eq!(span.len(), 2);
    }

    #[test]
    fn test_series_stops_at_blank_value() {
        let mut sheet = order_sheet(&["1,000원", "", "3,000원"]);
        sheet.set(5, 1, "keep").unwrap();
        assert_eq!(extract_series(&sheet, ORDER_SERIES), Some(vec![1000]));
    }

    #[test]
    fn test_non_numeric_value_becomes_zero() {
        let sheet = order_sheet(&["무료", "1,200원"]);
        assert_eq!(extract_series(&sheet, ORDER_SERIES), Some(vec![0, 1200]));
    }

    #[test]
    fn test_numeric_cells_are_read() {
        let mut sheet = Grid::new("Data");
        sheet.set(1, 2, "요청금액").unwrap();
        sheet.set(2, 2, CellValue::Float(4500.0)).unwrap();
        sheet.set(3, 2, 700).unwrap();
        assert_eq!(extract_series(&sheet, DISCOUNT_SERIES), Some(vec![4500, 700]));
    }

    #[test]
    fn test_fold_order_band() {
        let mut master = master_with(&[(5, "Acme")]);
        let sheet = order_sheet(&["1,000원", "2,500원"]);

        let outcome = fold_company(&mut master, "Acme", &sheet).unwrap().unwrap();
        assert_eq!(outcome.master_row, 5);
        assert_eq!(outcome.orders, Some(2));
        assert_eq!(master.get(5, 18), Some(&CellValue::Int(1000)));
        assert_eq!(master.get(5, 19), Some(&CellValue::Int(2500)));
        assert_eq!(master.get(5, 20), None);
    }

    #[test]
    fn test_unmatched_company_leaves_master_unchanged() {
        let mut master = master_with(&[(5, "Acme"), (6, "Beta")]);
        master.set(6, 18, 42).unwrap();
        let before = master.clone();

        let outcome = fold_company(&mut master, "Gamma", &order_sheet(&["9원"])).unwrap();
        assert!(outcome.is_none());
        assert_eq!(master, before);
    }

    #[test]
    fn test_first_matching_master_row_wins() {
        let mut master = master_with(&[(3, "Acme"), (8, "Acme")]);
        fold_company(&mut master, "Acme", &order_sheet(&["5원"])).unwrap();
        assert_eq!(master.get(3, 18), Some(&CellValue::Int(5)));
        assert_eq!(master.get(8, 18), None);
    }

    #[test]
    fn test_estimate_band_follows_discount_band() {
        let dataset = ExtractedDataset {
            discount_rows: vec![
                RawRow::new(["a", "100원"]),
                RawRow::new(["b", "200원"]),
            ],
            estimate_rows: vec![RawRow::new(["c", "3,000원"])],
            ..Default::default()
        };
        let (sheet, _) = build_company_sheet(&dataset);
        let mut master = master_with(&[(2, "Acme")]);

        let outcome = fold_company(&mut master, "Acme", &sheet).unwrap().unwrap();
        assert_eq!(outcome.orders, None);
        assert_eq!(outcome.discounts, Some(2));
        assert_eq!(outcome.estimates, Some(1));
        assert_eq!(master.get(2, 52), Some(&CellValue::Int(100)));
        assert_eq!(master.get(2, 53), Some(&CellValue::Int(200)));
        assert_eq!(master.get(2, 54), Some(&CellValue::Int(3000)));
    }

    #[test]
    fn test_empty_discount_series_does_not_shift_estimates() {
        let mut sheet = Grid::new("Data");
        sheet.append(["의뢰인", "요청금액"]);
        sheet.append(Vec::<String>::new());
        sheet.append(["의뢰인", "총금액"]);
        sheet.append(["c", "7,000원"]);
        let mut master = master_with(&[(4, "Acme")]);

        let outcome = fold_company(&mut master, "Acme", &sheet).unwrap().unwrap();
        assert_eq!(outcome.discounts, Some(0));
        assert_eq!(master.get(4, 52), Some(&CellValue::Int(7000)));
        assert_eq!(master.get(4, 53), None);
    }

    #[test]
    fn test_missing_markers_leave_bands_untouched() {
        let mut master = master_with(&[(2, "Acme")]);
        master.set(2, 18, 1).unwrap();
        master.set(2, 52, 2).unwrap();
        let before = master.clone();

        let (sheet, _) = build_company_sheet(&ExtractedDataset::default());
        let outcome = fold_company(&mut master, "Acme", &sheet).unwrap().unwrap();
        assert_eq!(outcome.orders, None);
        assert_eq!(outcome.discounts, None);
        assert_eq!(outcome.estimates, None);
        assert_eq!(master, before);
    }
}
