//! 스크랩 데이터 타입 정의
//!
//! - RawRow: HTML 표 한 행의 셀 텍스트
//! - ExtractedDataset: 업체 1곳의 대시보드에서 추출한 전체 데이터

use crate::normalize::normalize_name;

/// 텍스트 블록이 없을 때 기록하는 값
pub const NO_DATA: &str = "데이터 없음";

/// 표 한 행 (trim된 셀 텍스트, 열 개수 보장 없음)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(pub Vec<String>);

impl RawRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(Into::into).collect())
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 첫 셀의 이름 키. 셀이 하나도 없으면 None
    pub fn identity(&self) -> Option<&str> {
        self.0.first().map(|label| normalize_name(label))
    }
}

/// 주문/에누리/견적 행은 모두 첫 셀에 거래처 라벨을 갖는다
pub type CompanyRecord = RawRow;

/// 대시보드의 자유 텍스트 블록 4종
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBlock {
    NewInquiry,
    NewProductInquiry,
    NewVisitRequest,
    NewLayoutRequest,
}

impl TextBlock {
    /// 시트에 기록되는 순서
    pub const ALL: [TextBlock; 4] = [
        TextBlock::NewInquiry,
        TextBlock::NewProductInquiry,
        TextBlock::NewVisitRequest,
        TextBlock::NewLayoutRequest,
    ];

    /// 시트 라벨
    pub fn label(&self) -> &'static str {
        match self {
            TextBlock::NewInquiry => "신규 1:1 문의",
            TextBlock::NewProductInquiry => "신규 상품 문의",
            TextBlock::NewVisitRequest => "신규 방문견적 신청",
            TextBlock::NewLayoutRequest => "신규 레이아웃 신청",
        }
    }

    /// 페이지 요소 id
    pub fn element_id(&self) -> &'static str {
        match self {
            TextBlock::NewInquiry => "mentomen_new_div",
            TextBlock::NewProductInquiry => "pfo_new_div",
            TextBlock::NewVisitRequest => "ele_new_div",
            TextBlock::NewLayoutRequest => "lay_new_div",
        }
    }
}

/// 레코드 스트림 3종
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Order,
    Discount,
    Estimate,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Stream::Order, Stream::Discount, Stream::Estimate];

    /// 페이지 표 id
    pub fn table_id(&self) -> &'static str {
        match self {
            Stream::Order => "today_order",
            Stream::Discount => "today_discount",
            Stream::Estimate => "today_online",
        }
    }

    /// 섹션 제목
    pub fn title(&self) -> &'static str {
        match self {
            Stream::Order => "주문정보",
            Stream::Discount => "에누리신청리스트",
            Stream::Estimate => "견적리스트",
        }
    }

    /// 열 머리글
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Stream::Order => &[
                "주문정보",
                "주문접수일",
                "배송방법",
                "주문자/입금자",
                "회원구분",
                "결제금액",
                "진행상태",
                "결제종류",
            ],
            Stream::Discount => &["의뢰인", "요청금액", "연락처", "최초상담원"],
            Stream::Estimate => &["의뢰인", "총금액", "연락처", "최초상담원"],
        }
    }
}

/// 업체 1곳, 1회 실행분의 추출 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDataset {
    pub order_rows: Vec<CompanyRecord>,
    pub discount_rows: Vec<CompanyRecord>,
    pub estimate_rows: Vec<CompanyRecord>,
    pub new_inquiry_text: String,
    pub new_product_inquiry_text: String,
    pub new_visit_request_text: String,
    pub new_layout_request_text: String,
}

impl Default for ExtractedDataset {
    fn default() -> Self {
        Self {
            order_rows: Vec::new(),
            discount_rows: Vec::new(),
            estimate_rows: Vec::new(),
            new_inquiry_text: NO_DATA.to_string(),
            new_product_inquiry_text: NO_DATA.to_string(),
            new_visit_request_text: NO_DATA.to_string(),
            new_layout_request_text: NO_DATA.to_string(),
        }
    }
}

impl ExtractedDataset {
    pub fn rows(&self, stream: Stream) -> &[CompanyRecord] {
        match stream {
            Stream::Order => &self.order_rows,
            Stream::Discount => &self.discount_rows,
            Stream::Estimate => &self.estimate_rows,
        }
    }

    pub fn rows_mut(&mut self, stream: Stream) -> &mut Vec<CompanyRecord> {
        match stream {
            Stream::Order => &mut self.order_rows,
            Stream::Discount => &mut self.discount_rows,
            Stream::Estimate => &mut self.estimate_rows,
        }
    }

    pub fn text(&self, block: TextBlock) -> &str {
        match block {
            TextBlock::NewInquiry => &self.new_inquiry_text,
            TextBlock::NewProductInquiry => &self.new_product_inquiry_text,
            TextBlock::NewVisitRequest => &self.new_visit_request_text,
            TextBlock::NewLayoutRequest => &self.new_layout_request_text,
        }
    }

    pub fn set_text(&mut self, block: TextBlock, text: String) {
        let slot = match block {
            TextBlock::NewInquiry => &mut self.new_inquiry_text,
            TextBlock::NewProductInquiry => &mut self.new_product_inquiry_text,
            TextBlock::NewVisitRequest => &mut self.new_visit_request_text,
            TextBlock::NewLayoutRequest => &mut self.new_layout_request_text,
        };
        *slot = text;
    }
}
