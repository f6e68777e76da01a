//! Thyroid OCR Core Library
//!
//! Deterministic extraction of thyroid lab and ultrasound fields from OCR text.
//!
//! # Architecture
//!
//! ```text
//! OCR fragments ──► TextAssembler ──► AssembledText
//!                                          │
//!                        ┌─────────────────┴─────────────────┐
//!                        │ mode = lab                        │ mode = ultrasound
//!                        ▼                                   ▼
//!               IndicatorExtractor                  UltrasoundExtractor
//!               (ordered rule table)                (10-step cascade)
//!               + DateNormalizer                    SizeParser, DateNormalizer
//!                        │                                   │
//!                        └─────────────────┬─────────────────┘
//!                                          ▼
//!                          ExtractionReport { indicators, count, rawText }
//!                                          │
//!                                          ▼
//!                             Reference ranges (High/Low/Normal)
//! ```
//!
//! # Core Principle
//!
//! **Extraction never fails.** Unrecognized input yields an empty report with
//! `count == 0`, which the host treats as "enter manually".
//!
//! # Modules
//!
//! - [`models`]: Domain types (IndicatorKey, UltrasoundFinding, ExtractionReport, etc.)
//! - [`extractor`]: Text assembly, lab rules, ultrasound cascade, date and size parsing
//! - [`reference`]: Reference ranges and indicator status

pub mod extractor;
pub mod models;
pub mod reference;

// Re-export commonly used types
pub use extractor::{
    DateNormalizer, Extractor, ExtractorConfig, IndicatorExtractor, TextAssembler,
    UltrasoundExtractor,
};
pub use models::{
    AssembledText, ExtractedIndicatorSet, ExtractionReport, IndicatorKey, IndicatorValue,
    LabExtraction, ReportMode, UltrasoundField, UltrasoundFinding,
};
pub use reference::{IndicatorStatus, ReferenceRange};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::LazyLock;

static EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::new);

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ThyroidOcrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ThyroidOcrError {
    fn from(e: serde_json::Error) -> Self {
        ThyroidOcrError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Extraction (exported to FFI)
// =========================================================================

/// Extract a report from OCR fragments. Unknown modes are treated as lab panels.
#[uniffi::export]
pub fn extract_report(fragments: Vec<String>, mode: String) -> FfiExtractionReport {
    EXTRACTOR
        .extract(fragments.as_slice(), ReportMode::parse_lenient(&mode))
        .into()
}

/// Extract a report and return it in the JSON wire shape.
#[uniffi::export]
pub fn extract_report_json(
    fragments: Vec<String>,
    mode: String,
) -> Result<String, ThyroidOcrError> {
    let report = EXTRACTOR.extract(fragments.as_slice(), ReportMode::parse_lenient(&mode));
    Ok(report.to_json()?)
}

// =========================================================================
// Reference Ranges (exported to FFI)
// =========================================================================

/// Status of a value against the built-in range for `key` (e.g. "TSH").
#[uniffi::export]
pub fn assess_indicator_value(key: String, value: String) -> FfiIndicatorStatus {
    match IndicatorKey::from_wire(&key) {
        Some(key) => reference::assess_indicator(key, &value).into(),
        None => FfiIndicatorStatus::Unknown,
    }
}

/// Status of a value against a printed reference such as "0.27 - 4.2".
#[uniffi::export]
pub fn assess_reference_value(value: String, reference_text: String) -> FfiIndicatorStatus {
    reference::assess_with_reference(&value, &reference_text).into()
}

/// Built-in reference range for `key`, if any.
#[uniffi::export]
pub fn reference_range(key: String) -> Result<Option<FfiReferenceRange>, ThyroidOcrError> {
    let key = IndicatorKey::from_wire(&key)
        .ok_or_else(|| ThyroidOcrError::InvalidInput(format!("unknown indicator: {}", key)))?;
    Ok(ReferenceRange::for_key(key).cloned().map(|r| r.into()))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe extraction report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExtractionReport {
    pub indicators: HashMap<String, String>,
    pub count: u32,
    pub raw_text: String,
}

impl From<ExtractionReport> for FfiExtractionReport {
    fn from(report: ExtractionReport) -> Self {
        Self {
            indicators: report.indicators.into_iter().collect(),
            count: report.count as u32,
            raw_text: report.raw_text,
        }
    }
}

/// FFI-safe indicator status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiIndicatorStatus {
    NotEntered,
    Invalid,
    High,
    Low,
    Normal,
    Unknown,
}

impl From<IndicatorStatus> for FfiIndicatorStatus {
    fn from(status: IndicatorStatus) -> Self {
        match status {
            IndicatorStatus::NotEntered => FfiIndicatorStatus::NotEntered,
            IndicatorStatus::Invalid => FfiIndicatorStatus::Invalid,
            IndicatorStatus::High => FfiIndicatorStatus::High,
            IndicatorStatus::Low => FfiIndicatorStatus::Low,
            IndicatorStatus::Normal => FfiIndicatorStatus::Normal,
            IndicatorStatus::Unknown => FfiIndicatorStatus::Unknown,
        }
    }
}

/// FFI-safe reference range.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReferenceRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub name: String,
}

impl From<ReferenceRange> for FfiReferenceRange {
    fn from(range: ReferenceRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            unit: range.unit,
            name: range.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_extract_report() {
        let report = extract_report(
            vec!["TSH".into(), "3.50".into(), "mIU/L".into()],
            "lab".into(),
        );
        assert_eq!(report.count, 1);
        assert_eq!(report.indicators.get("TSH").map(String::as_str), Some("3.50"));
        assert_eq!(report.indicators.get("TSH_unit").map(String::as_str), Some("mIU/L"));
    }

    #[test]
    fn test_ffi_unknown_mode_is_lab() {
        let report = extract_report(vec!["FT4 16.1".into()], "ct".into());
        assert_eq!(report.indicators.get("FT4").map(String::as_str), Some("16.1"));
    }

    #[test]
    fn test_ffi_extract_report_json() {
        let json = extract_report_json(vec![], "ultrasound".into()).unwrap();
        assert_eq!(json, r#"{"indicators":{},"count":0,"rawText":""}"#);
    }

    #[test]
    fn test_ffi_assess() {
        assert_eq!(
            assess_indicator_value("TSH".into(), "5.0".into()),
            FfiIndicatorStatus::High
        );
        assert_eq!(
            assess_indicator_value("XYZ".into(), "5.0".into()),
            FfiIndicatorStatus::Unknown
        );
        assert_eq!(
            assess_reference_value("12".into(), "< 34".into()),
            FfiIndicatorStatus::Normal
        );
    }

    #[test]
    fn test_ffi_reference_range() {
        let tg = reference_range("Tg".into()).unwrap().unwrap();
        assert_eq!(tg.max, 77.0);
        assert!(reference_range("PTH".into()).unwrap().is_none());
        assert!(matches!(
            reference_range("nope".into()),
            Err(ThyroidOcrError::InvalidInput(_))
        ));
    }
}
