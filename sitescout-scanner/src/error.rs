use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Request cancelled: {0}")]
    Cancelled(String),
}

impl From<quick_xml::Error> for ScanError {
    fn from(err: quick_xml::Error) -> Self {
        ScanError::ParseError(format!("XML parse error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
