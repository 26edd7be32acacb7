//! 업체별 리포트 파일 저장 (`<파일명>.xlsx`)

use crate::error::Result;
use crate::workbook::save_workbook;
use daily_sales_common::{build_company_sheet, ExtractedDataset, ReportSummary, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

pub const XLSX_EXTENSION: &str = "xlsx";

pub fn report_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", stem, XLSX_EXTENSION))
}

/// 리포트를 만들어 저장한다. 같은 이름의 파일은 덮어쓴다.
pub fn write_company_report(
    dataset: &ExtractedDataset,
    stem: &str,
    output_dir: &Path,
) -> Result<(PathBuf, ReportSummary)> {
    let (sheet, summary) = build_company_sheet(dataset);
    let path = report_path(output_dir, stem);

    save_workbook(&Workbook::with_sheet(sheet), &path)?;
    info!(
        company = %stem,
        path = %path.display(),
        orders = summary.orders,
        discounts = summary.discounts,
        estimates = summary.estimates,
        flagged = summary.flagged,
        "업체 리포트 저장"
    );

    Ok((path, summary))
}
