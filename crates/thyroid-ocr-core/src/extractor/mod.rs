//! Clinical report extraction engine.
//!
//! Pipeline: OCR fragments → Assembly → Lab rules | Ultrasound cascade → Report

mod assembler;
mod date;
mod indicator;
mod size;
mod ultrasound;

pub use assembler::*;
pub use date::*;
pub use indicator::*;
pub use size::{format_size, parse_size, SizeSpec};
pub use ultrasound::*;

use serde::{Deserialize, Serialize};

use crate::models::{AssembledText, ExtractionReport, LabExtraction, ReportMode, UltrasoundFinding};

/// Default number of characters of assembled text echoed back as `rawText`.
pub const RAW_TEXT_LIMIT: usize = 500;

/// Extractor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Characters of assembled text included in the report
    pub raw_text_limit: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            raw_text_limit: RAW_TEXT_LIMIT,
        }
    }
}

/// Main extractor that coordinates assembly and mode dispatch.
///
/// Holds no per-call state; one instance can serve any number of threads.
pub struct Extractor {
    config: ExtractorConfig,
    assembler: TextAssembler,
    indicators: IndicatorExtractor,
    ultrasound: UltrasoundExtractor,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Create an extractor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create an extractor with custom settings.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            config,
            assembler: TextAssembler::new(),
            indicators: IndicatorExtractor::new(),
            ultrasound: UltrasoundExtractor::new(),
        }
    }

    /// Extract a report from OCR fragments.
    ///
    /// Never fails: unrecognized input yields a report with `count == 0`.
    pub fn extract<S: AsRef<str>>(&self, fragments: &[S], mode: ReportMode) -> ExtractionReport {
        // Step 1: Assemble fragments into canonical text
        let text = self.assembler.assemble(fragments);
        let raw_text = text.truncated(self.config.raw_text_limit);

        // Step 2: Dispatch on mode
        let report = match mode {
            ReportMode::Lab => ExtractionReport::from_lab(&self.extract_lab(&text), raw_text),
            ReportMode::Ultrasound => {
                ExtractionReport::from_ultrasound(&self.extract_ultrasound(&text), raw_text)
            }
        };

        tracing::info!(mode = %mode, count = report.count, "report extracted");
        report
    }

    /// Lab-mode extraction over assembled text.
    pub fn extract_lab(&self, text: &AssembledText) -> LabExtraction {
        LabExtraction {
            indicators: self.indicators.extract(text.as_str()),
            record_date: DateNormalizer::lab().normalize(text.as_str()),
        }
    }

    /// Ultrasound-mode extraction over assembled text.
    pub fn extract_ultrasound(&self, text: &AssembledText) -> UltrasoundFinding {
        self.ultrasound.extract(text.as_str())
    }

    /// Get the assembler for direct access.
    pub fn assembler(&self) -> &TextAssembler {
        &self.assembler
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }
}
