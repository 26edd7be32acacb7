//! 일일매출 마스터 파일 생성
//!
//! 템플릿을 매번 새로 읽고, 결과 폴더의 업체별 파일을 모두 다시 병합해
//! `<템플릿명>_<YYYYMMDD>.xlsx` 로 저장한다. 마스터는 템플릿 파일에 바뀐 셀만
//! 덮어써 만들므로 템플릿의 서식과 날짜 셀이 유지된다.

use crate::error::{Result, SalesError};
use crate::report::XLSX_EXTENSION;
use crate::workbook::{load_active_sheet, load_sheet, patch_workbook_file};
use chrono::NaiveDate;
use daily_sales_common::export::patch::SheetPatch;
use daily_sales_common::merge::fold_company;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// 템플릿 파일명 끝의 표시
const TEMPLATE_SUFFIX: &str = "_템플릿";
/// 엑셀 잠금 파일 접두어
const LOCK_FILE_PREFIX: &str = "~$";

/// 병합 설정 (실행 날짜 포함)
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub output_dir: PathBuf,
    pub template_path: PathBuf,
    pub master_sheet: String,
    pub date: NaiveDate,
}

/// 병합 결과
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub master_path: PathBuf,
    /// 마스터 행을 찾아 병합한 업체
    pub merged: Vec<String>,
    /// 마스터에 행이 없어 건너뛴 업체
    pub unmatched: Vec<String>,
}

/// 마스터 파일명: 템플릿 파일명에서 `_템플릿` 을 떼고 날짜를 붙인다
pub fn master_file_name(template_path: &Path, date: NaiveDate) -> String {
    let stem = template_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let base = stem.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(&stem);
    format!("{}_{}.{}", base, date.format("%Y%m%d"), XLSX_EXTENSION)
}

pub fn master_path(config: &MergeConfig) -> PathBuf {
    config
        .output_dir
        .join(master_file_name(&config.template_path, config.date))
}

/// 결과 폴더의 업체별 파일 (파일명 순). 마스터 파일과 잠금 파일은 제외
pub fn company_files(output_dir: &Path, master_name: &str) -> Result<Vec<PathBuf>> {
    if !output_dir.exists() {
        return Err(SalesError::FolderNotFound(output_dir.display().to_string()));
    }

    let files = WalkDir::new(output_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            e.path().extension().is_some_and(|ext| ext == XLSX_EXTENSION)
                && name != master_name
                && !name.starts_with(LOCK_FILE_PREFIX)
        })
        .map(|e| e.into_path())
        .collect();

    Ok(files)
}

/// 템플릿 + 업체별 파일 → 마스터 파일
pub fn merge_into_master(config: &MergeConfig) -> Result<MergeReport> {
    let master_name = master_file_name(&config.template_path, config.date);
    let master_path = config.output_dir.join(&master_name);

    let template = load_sheet(&config.template_path, &config.master_sheet)?;
    let mut master = template.clone();

    let mut report = MergeReport {
        master_path: master_path.clone(),
        ..Default::default()
    };

    for path in company_files(&config.output_dir, &master_name)? {
        let company = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let sheet = load_active_sheet(&path)?;

        match fold_company(&mut master, &company, &sheet)? {
            Some(outcome) => {
                debug!(
                    company = %company,
                    row = outcome.master_row,
                    orders = ?outcome.orders,
                    discounts = ?outcome.discounts,
                    estimates = ?outcome.estimates,
                    "마스터 행 병합"
                );
                report.merged.push(company);
            }
            None => {
                debug!(company = %company, "마스터 시트에 업체 행 없음");
                report.unmatched.push(company);
            }
        }
    }

    let changes = SheetPatch::diff(&template, &master);
    patch_workbook_file(&config.template_path, &master_path, &config.master_sheet, &changes)?;
    info!(
        path = %master_path.display(),
        cells = changes.len(),
        merged = report.merged.len(),
        unmatched = report.unmatched.len(),
        "마스터 파일 저장"
    );

    Ok(report)
}
