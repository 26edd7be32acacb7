//! 업체별 처리 루프
//!
//! 업체 1곳의 실패(로그인, 추출, 저장, 병합)는 기록만 하고 다음 업체로 넘어간다.
//! 계정 목록을 읽지 못하는 경우만 전체 실행을 중단한다.

use crate::config::MergeSchedule;
use crate::error::Result;
use crate::extract::extract_dataset;
use crate::merge::{merge_into_master, MergeConfig, MergeReport};
use crate::portal::PageSource;
use crate::report::write_company_report;
use crate::roster::RosterEntry;
use std::path::PathBuf;
use tracing::{info, warn};

/// 업체 1곳의 처리 결과
#[derive(Debug)]
pub enum CompanyOutcome {
    Written { report: PathBuf, master: Option<PathBuf> },
    Failed { error: String },
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(String, CompanyOutcome)>,
    /// 마지막으로 저장된 마스터 파일
    pub master_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, CompanyOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// 업체 1곳: 페이지 → 추출 → 리포트 저장 (→ 병합)
async fn process_company<S: PageSource>(
    source: &S,
    entry: &RosterEntry,
    merge: &MergeConfig,
    schedule: MergeSchedule,
) -> Result<(PathBuf, Option<MergeReport>)> {
    let html = source.fetch(entry).await?;
    let dataset = extract_dataset(&html);
    let (report_path, _) = write_company_report(&dataset, &entry.stem, &merge.output_dir)?;

    let master = match schedule {
        MergeSchedule::EachCompany => Some(merge_into_master(merge)?),
        MergeSchedule::Once => None,
    };

    Ok((report_path, master))
}

pub async fn run<S: PageSource>(
    source: &S,
    roster: &[RosterEntry],
    merge: &MergeConfig,
    schedule: MergeSchedule,
) -> Result<RunSummary> {
    std::fs::create_dir_all(&merge.output_dir)?;
    let mut summary = RunSummary::default();

    for entry in roster {
        info!(company = %entry.stem, "작업 중");
        let outcome = match process_company(source, entry, merge, schedule).await {
            Ok((report, master)) => {
                let master = master.map(|m| m.master_path);
                if master.is_some() {
                    summary.master_path = master.clone();
                }
                CompanyOutcome::Written { report, master }
            }
            Err(e) => {
                warn!(company = %entry.stem, error = %e, "업체 처리 실패, 다음 업체로 진행");
                CompanyOutcome::Failed { error: e.to_string() }
            }
        };
        summary.outcomes.push((entry.stem.clone(), outcome));
    }

    if schedule == MergeSchedule::Once && summary.succeeded() > 0 {
        let report = merge_into_master(merge)?;
        summary.master_path = Some(report.master_path);
    }

    Ok(summary)
}
