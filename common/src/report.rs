//! 업체별 리포트 시트 생성
//!
//! 시트 구성 (위에서부터):
//! 1. 자유 텍스트 4행 `[라벨, 내용]` + 빈 행
//! 2. 주문정보 (있을 때만) + 빈 행
//! 3. 에누리신청리스트 (있을 때만) + 빈 행
//! 4. 견적리스트 (있을 때만) + 빈 행
//!
//! 에누리/견적 행 중 주문자와 같은 거래처는 지우지 않고 노란색으로 표시한다.

use crate::grid::{Fill, Grid};
use crate::types::{CompanyRecord, ExtractedDataset, Stream, TextBlock};
use std::collections::HashSet;

/// 리포트 시트 이름
pub const REPORT_SHEET_NAME: &str = "Data";

/// 주문 스트림의 이름 키 집합 (중복 판정 전용, 읽기 전용)
#[derive(Debug, Default)]
pub struct OrderIdentities<'a> {
    names: HashSet<&'a str>,
}

impl<'a> OrderIdentities<'a> {
    pub fn from_orders(orders: &'a [CompanyRecord]) -> Self {
        Self {
            names: orders.iter().filter_map(|row| row.identity()).collect(),
        }
    }

    /// 주문 스트림에도 있는 거래처인지
    pub fn contains(&self, row: &CompanyRecord) -> bool {
        row.identity().is_some_and(|name| self.names.contains(name))
    }
}

/// 작성 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub orders: usize,
    pub discounts: usize,
    pub estimates: usize,
    /// 노란색으로 표시한 행 수
    pub flagged: usize,
}

/// 추출 데이터로 리포트 시트를 만든다
pub fn build_company_sheet(dataset: &ExtractedDataset) -> (Grid, ReportSummary) {
    let mut grid = Grid::new(REPORT_SHEET_NAME);
    let mut summary = ReportSummary::default();

    for block in TextBlock::ALL {
        grid.append([block.label(), dataset.text(block)]);
    }
    grid.append(Vec::<String>::new());

    // 주문 스트림 전체로 먼저 키 집합을 만든 뒤 다른 스트림을 판정한다
    let orders = OrderIdentities::from_orders(&dataset.order_rows);

    if !dataset.order_rows.is_empty() {
        write_section_head(&mut grid, Stream::Order);
        for row in &dataset.order_rows {
            grid.append(row.cells());
        }
        grid.append(Vec::<String>::new());
        summary.orders = dataset.order_rows.len();
    }

    for stream in [Stream::Discount, Stream::Estimate] {
        let rows = dataset.rows(stream);
        if rows.is_empty() {
            continue;
        }
        write_section_head(&mut grid, stream);
        for row in rows {
            let duplicate = orders.contains(row);
            grid.append_filled(row.cells(), duplicate.then_some(Fill::HIGHLIGHT));
            if duplicate {
                summary.flagged += 1;
            }
        }
        grid.append(Vec::<String>::new());

        match stream {
            Stream::Discount => summary.discounts = rows.len(),
            Stream::Estimate => summary.estimates = rows.len(),
            Stream::Order => {}
        }
    }

    (grid, summary)
}

fn write_section_head(grid: &mut Grid, stream: Stream) {
    grid.append([stream.title()]);
    grid.append(stream.header().iter().copied());
}
