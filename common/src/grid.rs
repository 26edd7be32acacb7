//! 시트 격자 모델
//!
//! 스프레드시트 파일을 (행, 열) 키로 접근하는 2차원 격자로 다룬다.
//! 행/열 번호는 모두 1부터 시작한다 (A1 = (1, 1)).

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// 셀 값
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// 날짜/시각 (엑셀 일련값)
    DateTime(f64),
    /// 수식 (선행 `=` 없이 저장)
    Formula(String),
}

impl CellValue {
    /// 빈 셀 또는 빈 문자열
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            CellValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// 표시용 문자열. 정수 값의 실수는 소수점 없이 출력
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Float(v) | CellValue::DateTime(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                format!("{}", *v as i64)
            }
            CellValue::Float(v) | CellValue::DateTime(v) => v.to_string(),
            CellValue::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
            CellValue::Formula(f) => format!("={}", f),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::Text(s.clone())
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v.into())
    }
}

/// 단색 채우기 (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill(pub u32);

impl Fill {
    /// 중복 거래처 표시용 노란색
    pub const HIGHLIGHT: Fill = Fill(0xFFFF00);
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub fill: Option<Fill>,
}

/// 시트 1장
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    /// 마지막으로 append/set 된 행
    cursor: u32,
}

fn check_coord(row: u32, col: u32) -> Result<()> {
    if row == 0 || col == 0 {
        return Err(Error::Grid(format!("({}, {}) is not a 1-based coordinate", row, col)));
    }
    Ok(())
}

impl Grid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            cursor: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// 셀 값. 한 번도 쓰지 않은 셀은 None
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cell(row, col).map(|c| &c.value)
    }

    pub fn fill(&self, row: u32, col: u32) -> Option<Fill> {
        self.cell(row, col).and_then(|c| c.fill)
    }

    pub fn set(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Result<()> {
        check_coord(row, col)?;
        self.cells.entry((row, col)).or_default().value = value.into();
        self.cursor = self.cursor.max(row);
        Ok(())
    }

    pub fn set_fill(&mut self, row: u32, col: u32, fill: Fill) -> Result<()> {
        check_coord(row, col)?;
        self.cells.entry((row, col)).or_default().fill = Some(fill);
        self.cursor = self.cursor.max(row);
        Ok(())
    }

    /// 다음 행에 값을 차례로 기록하고 그 행 번호를 반환
    ///
    /// 빈 행을 append 해도 커서는 한 행 전진한다.
    pub fn append<I, V>(&mut self, values: I) -> u32
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.append_filled(values, None)
    }

    /// `append` 와 같고, 기록한 셀마다 채우기를 함께 지정한다
    pub fn append_filled<I, V>(&mut self, values: I, fill: Option<Fill>) -> u32
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let row = self.cursor + 1;
        for (idx, value) in values.into_iter().enumerate() {
            let cell = self.cells.entry((row, idx as u32 + 1)).or_default();
            cell.value = value.into();
            if fill.is_some() {
                cell.fill = fill;
            }
        }
        self.cursor = row;
        row
    }

    /// 마지막 append 위치
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// 셀이 존재하는 가장 큰 행 번호 (비어 있으면 0)
    pub fn max_row(&self) -> u32 {
        self.cells.keys().next_back().map(|(r, _)| *r).unwrap_or(0)
    }

    /// 셀이 존재하는 가장 큰 열 번호 (비어 있으면 0)
    pub fn max_col(&self) -> u32 {
        self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// 한 행의 셀을 열 순서로
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells
            .range((row, 1)..=(row, u32::MAX))
            .map(|((_, c), cell)| (*c, cell))
    }

    /// 모든 셀을 행 우선 순서로
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> {
        self.cells.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// 시트 묶음 (파일 1개)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Grid>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(sheet: Grid) -> Self {
        Self { sheets: vec![sheet] }
    }

    pub fn add_sheet(&mut self, sheet: Grid) -> Result<&mut Grid> {
        if self.sheet(sheet.name()).is_some() {
            return Err(Error::Grid(format!("duplicate sheet name: {}", sheet.name())));
        }
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    pub fn sheets(&self) -> &[Grid] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Grid> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Grid> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// 첫 번째 시트 (활성 시트로 취급)
    pub fn active(&self) -> Option<&Grid> {
        self.sheets.first()
    }
}
