//! OCR vendor boundary for thyroid report extraction.
//!
//! Converts a recognition payload into ordered text fragments and hands them
//! to the core extractor:
//!
//! ```text
//! image (base64 / data URL) ──► OcrTransport ──► vendor JSON
//!                                                   │
//!                                     parse_vendor_response
//!                                                   │
//!                                   Vec<fragment> ──► Extractor ──► ExtractionReport
//! ```
//!
//! Request signing and HTTP live behind [`OcrTransport`]; this crate ships no
//! network client.

mod config;
mod error;
mod response;
mod transport;

pub use config::*;
pub use error::*;
pub use response::*;
pub use transport::*;
