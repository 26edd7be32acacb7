//! 대시보드 HTML → 추출 데이터
//!
//! - 표 3종 (`#today_order`, `#today_discount`, `#today_online`): 첫 행(헤더) 이후의 `tr`
//! - 자유 텍스트 4종 (`#mentomen_new_div` 등): 없으면 "데이터 없음"

use daily_sales_common::{ExtractedDataset, RawRow, Stream, TextBlock};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

static TD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid td selector"));

fn id_selector(id: &str, descendant: Option<&str>) -> Option<Selector> {
    let css = match descendant {
        Some(tag) => format!("#{} {}", id, tag),
        None => format!("#{}", id),
    };
    let parsed = match Selector::parse(&css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = %css, error = ?e, "잘못된 선택자");
            None
        }
    };
    parsed
}

/// 셀 텍스트: 하위 텍스트를 모두 이어 붙인 뒤 trim
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// 블록 텍스트: 텍스트 노드를 줄바꿈으로 이은 뒤 trim
fn block_text(block: ElementRef<'_>) -> String {
    block.text().collect::<Vec<_>>().join("\n").trim().to_string()
}

/// 표의 헤더 이후 행. 표가 없으면 빈 Vec
pub fn table_rows(doc: &Html, table_id: &str) -> Vec<RawRow> {
    let Some(selector) = id_selector(table_id, Some("tr")) else {
        return Vec::new();
    };
    doc.select(&selector)
        .skip(1)
        .map(|tr| RawRow(tr.select(&TD_SELECTOR).map(cell_text).collect()))
        .collect()
}

/// 텍스트 블록. 요소가 없으면 None
pub fn text_block(doc: &Html, element_id: &str) -> Option<String> {
    let selector = id_selector(element_id, None)?;
    doc.select(&selector).next().map(block_text)
}

pub fn extract_dataset(html: &str) -> ExtractedDataset {
    let doc = Html::parse_document(html);
    let mut dataset = ExtractedDataset::default();

    for stream in Stream::ALL {
        let rows = table_rows(&doc, stream.table_id());
        debug!(table = stream.table_id(), rows = rows.len(), "표 추출");
        *dataset.rows_mut(stream) = rows;
    }

    for block in TextBlock::ALL {
        if let Some(text) = text_block(&doc, block.element_id()) {
            dataset.set_text(block, text);
        }
    }

    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use daily_sales_common::NO_DATA;

    #[test]
    fn test_header_row_skipped() {
        let html = r#"<table id="today_discount">
            <tr><th>의뢰인</th><th>요청금액</th></tr>
            <tr><td> 김철수[일반] </td><td>5,000원</td></tr>
        </table>"#;
        let doc = Html::parse_document(html);
        let rows = table_rows(&doc, "today_discount");
        assert_eq!(rows, vec![RawRow::new(["김철수[일반]", "5,000원"])]);
    }

    #[test]
    fn test_missing_table_is_empty() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(table_rows(&doc, "today_order").is_empty());
    }

    #[test]
    fn test_nested_text_is_flattened() {
        let html = r##"<table id="today_order">
            <tr><td>h</td></tr>
            <tr><td><a href="#">Alice</a><span>[VIP]</span></td><td><b>1,000</b>원</td></tr>
        </table>"##;
        let doc = Html::parse_document(html);
        let rows = table_rows(&doc, "today_order");
        assert_eq!(rows[0].cells(), ["Alice[VIP]", "1,000원"]);
    }

    #[test]
    fn test_text_block_joins_lines() {
        let html = r#"<div id="mentomen_new_div"><p>문의 A</p><p>문의 B</p></div>"#;
        let dataset = extract_dataset(html);
        assert_eq!(dataset.new_inquiry_text, "문의 A\n문의 B");
        assert_eq!(dataset.new_product_inquiry_text, NO_DATA);
    }

    #[test]
    fn test_empty_block_is_empty_string() {
        let html = r#"<div id="lay_new_div">   </div>"#;
        let dataset = extract_dataset(html);
        assert_eq!(dataset.new_layout_request_text, "");
    }
}
