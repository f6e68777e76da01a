//! Report mode and the caller-facing extraction result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LabExtraction, UltrasoundFinding};

/// Which extractor the caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Thyroid function / electrolyte lab panel
    #[default]
    Lab,
    /// Thyroid ultrasound report
    Ultrasound,
}

impl ReportMode {
    /// Parse a caller-supplied mode. Anything other than "ultrasound" is a lab panel.
    pub fn parse_lenient(mode: &str) -> Self {
        if mode.trim().eq_ignore_ascii_case("ultrasound") {
            ReportMode::Ultrasound
        } else {
            ReportMode::Lab
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Lab => "lab",
            ReportMode::Ultrasound => "ultrasound",
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire result returned to the caller for either mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// Flat field map (see `LabExtraction::to_wire_map` / `UltrasoundFinding::to_wire_map`)
    pub indicators: BTreeMap<String, String>,
    /// Number of extracted fields
    pub count: usize,
    /// Leading slice of the assembled text
    pub raw_text: String,
}

impl ExtractionReport {
    pub fn from_lab(lab: &LabExtraction, raw_text: String) -> Self {
        Self {
            indicators: lab.to_wire_map(),
            count: lab.field_count(),
            raw_text,
        }
    }

    pub fn from_ultrasound(finding: &UltrasoundFinding, raw_text: String) -> Self {
        Self {
            indicators: finding.to_wire_map(),
            count: finding.field_count(),
            raw_text,
        }
    }

    /// Nothing was extracted; the caller should fall back to manual entry.
    pub fn needs_manual_entry(&self) -> bool {
        self.count == 0
    }

    /// Serialize to the JSON wire shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
