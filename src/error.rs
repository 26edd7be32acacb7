use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("폴더를 찾을 수 없습니다: {0}")]
    FolderNotFound(String),

    #[error("계정 목록 오류: {0}")]
    Roster(String),

    #[error("엑셀 읽기 오류: {0}")]
    Workbook(String),

    #[error("시트를 찾을 수 없습니다: {0}")]
    SheetNotFound(String),

    #[error("로그인 실패: {0}")]
    Login(String),

    #[error("HTTP 오류: {0}")]
    Http(String),

    #[error("페이지 추출 오류: {0}")]
    Extract(String),

    #[error("엑셀 생성 오류: {0}")]
    ExcelGeneration(String),

    #[error("JSON 오류: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] daily_sales_common::Error),
}

impl From<reqwest::Error> for SalesError {
    fn from(e: reqwest::Error) -> Self {
        SalesError::Http(e.to_string())
    }
}

impl From<calamine::Error> for SalesError {
    fn from(e: calamine::Error) -> Self {
        SalesError::Workbook(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SalesError>;
