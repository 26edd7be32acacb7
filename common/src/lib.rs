//! Daily Sales Common Library
//!
//! 업체별 리포트 생성과 일일매출 템플릿 병합의 핵심 로직

pub mod types;
pub mod normalize;
pub mod grid;
pub mod report;
pub mod merge;
pub mod error;
pub mod export;

pub use types::{CompanyRecord, ExtractedDataset, RawRow, Stream, TextBlock, NO_DATA};
pub use normalize::{normalize_amount, normalize_name, parse_amount};
pub use grid::{Cell, CellValue, Fill, Grid, Workbook};
pub use report::{build_company_sheet, ReportSummary, REPORT_SHEET_NAME};
pub use merge::{fold_company, FoldOutcome, SeriesSpec};
pub use error::{Error, Result};
