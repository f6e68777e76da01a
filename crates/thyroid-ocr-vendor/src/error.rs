//! Vendor-boundary errors.

use thiserror::Error;

/// Failures surfaced by the OCR vendor boundary.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR credentials are not configured: {0}")]
    Configuration(String),

    #[error("OCR recognition failed: {0}")]
    Vendor(String),

    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Unexpected OCR response format: {0}")]
    ResponseFormat(String),

    #[error("No report image supplied")]
    InvalidImage,
}

impl From<serde_json::Error> for OcrError {
    fn from(e: serde_json::Error) -> Self {
        OcrError::ResponseFormat(e.to_string())
    }
}

pub type VendorResult<T> = Result<T, OcrError>;

impl OcrError {
    /// Short kind label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OcrError::Configuration(_) => "configuration",
            OcrError::Vendor(_) => "vendor",
            OcrError::Network(_) => "network",
            OcrError::ResponseFormat(_) => "response_format",
            OcrError::InvalidImage => "invalid_image",
        }
    }
}
