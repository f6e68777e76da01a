//! Dimension parsing (`L×W[×H]` with optional unit), normalized to millimeters.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Regex fragment for a dimension expression, reusable inside larger patterns.
pub(crate) const SIZE_EXPR: &str = r"[0-9]+\.?[0-9]*\s*[×*xX]\s*[0-9]+\.?[0-9]*(?:\s*[×*xX]\s*[0-9]+\.?[0-9]*)?\s*(?:(?i:mm|cm)|毫米|厘米)?";

static SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([0-9]+\.?[0-9]*)\s*[×*x]\s*([0-9]+\.?[0-9]*)\s*(?:[×*x]\s*([0-9]+\.?[0-9]*))?\s*(mm|cm|毫米|厘米)?",
    )
    .expect("valid size pattern")
});

/// A dimension normalized to millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub length: f64,
    pub width: f64,
    pub height: Option<f64>,
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.length, self.width)?;
        if let Some(height) = self.height {
            write!(f, "×{}", height)?;
        }
        f.write_str("mm")
    }
}

/// Parse the first dimension expression in `text`.
///
/// Centimeter values are multiplied by 10 and rounded to one decimal; millimeter
/// (or unit-less) values pass through as parsed.
pub fn parse_size(text: &str) -> Option<SizeSpec> {
    let caps = SIZE.captures(text)?;

    let centimeters = caps
        .get(4)
        .map(|u| matches!(u.as_str().to_lowercase().as_str(), "cm" | "厘米"))
        .unwrap_or(false);
    let convert = |raw: &str| -> Option<f64> {
        let n: f64 = raw.parse().ok()?;
        Some(if centimeters { round_tenth(n * 10.0) } else { n })
    };

    Some(SizeSpec {
        length: convert(caps.get(1)?.as_str())?,
        width: convert(caps.get(2)?.as_str())?,
        height: match caps.get(3) {
            Some(h) => Some(convert(h.as_str())?),
            None => None,
        },
    })
}

/// Parse and format in one step: `"45×15×13mm"`.
pub fn format_size(text: &str) -> Option<String> {
    parse_size(text).map(|s| s.to_string())
}

/// Round to one decimal place.
pub(crate) fn round_tenth(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}
