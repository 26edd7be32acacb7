//! 계정 목록 (업체별 로그인 정보) 읽기
//!
//! 시트 `계정정보`, 2행부터: A=파일명, B=로그인 URL, C=아이디, D=비밀번호

use crate::error::{Result, SalesError};
use crate::workbook::load_sheet;
use daily_sales_common::{CellValue, Grid};
use std::path::Path;
use tracing::debug;

const STEM_COL: u32 = 1;
const URL_COL: u32 = 2;
const USER_COL: u32 = 3;
const PASSWORD_COL: u32 = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// 결과 파일명 (확장자 제외) = 마스터 시트의 업체명
    pub stem: String,
    pub url: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RosterEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterEntry")
            .field("stem", &self.stem)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn cell_text(sheet: &Grid, row: u32, col: u32) -> String {
    sheet
        .get(row, col)
        .map(CellValue::to_display_string)
        .unwrap_or_default()
}

/// 헤더 행을 제외하고 파일명·URL이 모두 있는 행만 반환
pub fn parse_roster(sheet: &Grid) -> Vec<RosterEntry> {
    let mut entries = Vec::new();

    for row in 2..=sheet.max_row() {
        let stem = cell_text(sheet, row, STEM_COL);
        let url = cell_text(sheet, row, URL_COL);
        if stem.is_empty() || url.is_empty() {
            debug!(row, "파일명 또는 URL이 없는 행 건너뜀");
            continue;
        }
        entries.push(RosterEntry {
            stem,
            url,
            username: cell_text(sheet, row, USER_COL),
            password: cell_text(sheet, row, PASSWORD_COL),
        });
    }

    entries
}

pub fn read_roster(path: &Path, sheet: &str) -> Result<Vec<RosterEntry>> {
    let grid = load_sheet(path, sheet).map_err(|e| match e {
        SalesError::FileNotFound(_) | SalesError::SheetNotFound(_) => {
            SalesError::Roster(e.to_string())
        }
        other => other,
    })?;
    Ok(parse_roster(&grid))
}
