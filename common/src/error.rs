//! 오류 타입 정의

use thiserror::Error;

/// 공통 오류 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Grid error: {0}")]
    Grid(String),

    #[error("xlsx package error: {0}")]
    Package(String),
}

#[cfg(feature = "excel")]
impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Package(e.to_string())
    }
}

#[cfg(feature = "excel")]
impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Package(e.to_string())
    }
}

#[cfg(feature = "excel")]
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Error::Package(e.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
