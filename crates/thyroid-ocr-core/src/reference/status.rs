//! Indicator status against a reference interval.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ReferenceRange;
use crate::models::{IndicatorKey, LabExtraction};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)").expect("valid number pattern")
});

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9.]+)\s*-\s*([0-9.]+)").expect("valid range pattern")
});

/// Where a value falls relative to its reference interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorStatus {
    /// No value recorded
    NotEntered,
    /// Value is not numeric
    Invalid,
    High,
    Low,
    Normal,
    /// No reference interval known for the indicator
    Unknown,
}

impl IndicatorStatus {
    /// Label shown on Chinese report views.
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorStatus::NotEntered => "未录入",
            IndicatorStatus::Invalid => "无效",
            IndicatorStatus::High => "偏高",
            IndicatorStatus::Low => "偏低",
            IndicatorStatus::Normal => "正常",
            IndicatorStatus::Unknown => "未知",
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self, IndicatorStatus::High | IndicatorStatus::Low)
    }
}

impl fmt::Display for IndicatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify `value` against `[min, max]`.
///
/// The value is read like a lab sheet cell: leading number only, so "3.5↑" is 3.5.
pub fn assess(value: &str, min: f64, max: f64) -> IndicatorStatus {
    if value.trim().is_empty() {
        return IndicatorStatus::NotEntered;
    }
    let Some(number) = leading_number(value) else {
        return IndicatorStatus::Invalid;
    };

    if number > max {
        IndicatorStatus::High
    } else if number < min {
        IndicatorStatus::Low
    } else {
        IndicatorStatus::Normal
    }
}

/// Classify `value` against the built-in range for `key`.
pub fn assess_indicator(key: IndicatorKey, value: &str) -> IndicatorStatus {
    match ReferenceRange::for_key(key) {
        Some(range) => assess(value, range.min, range.max),
        None => IndicatorStatus::Unknown,
    }
}

/// Classify `value` against a printed reference such as `"0.27 - 4.2"`, `"< 34"` or `"> 1.5"`.
///
/// A blank value, blank reference or unrecognized reference is reported as normal.
pub fn assess_with_reference(value: &str, reference: &str) -> IndicatorStatus {
    let reference = reference.trim();
    if value.trim().is_empty() || reference.is_empty() {
        return IndicatorStatus::Normal;
    }

    if let Some(caps) = RANGE.captures(reference) {
        let bound = |i: usize| caps.get(i).and_then(|m| leading_number(m.as_str()));
        return assess(
            value,
            bound(1).unwrap_or(f64::NAN),
            bound(2).unwrap_or(f64::NAN),
        );
    }

    // Unparseable bounds compare false both ways and fall through to normal
    if let Some(rest) = reference.strip_prefix('<') {
        return assess(value, 0.0, leading_number(rest).unwrap_or(f64::NAN));
    }
    if let Some(rest) = reference.strip_prefix('>') {
        return assess(value, leading_number(rest).unwrap_or(f64::NAN), f64::INFINITY);
    }

    tracing::debug!(reference, "unrecognized reference interval");
    IndicatorStatus::Normal
}

impl LabExtraction {
    /// Status of every extracted indicator against the built-in ranges.
    pub fn assess(&self) -> BTreeMap<IndicatorKey, IndicatorStatus> {
        self.indicators
            .iter()
            .map(|(key, value)| (*key, assess_indicator(*key, &value.value)))
            .collect()
    }
}

fn leading_number(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(text)
        .and_then(|m| m.as_str().trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorValue;

    #[test]
    fn test_assess_bounds() {
        assert_eq!(assess("5.0", 0.27, 4.2), IndicatorStatus::High);
        assert_eq!(assess("0.1", 0.27, 4.2), IndicatorStatus::Low);
        assert_eq!(assess("4.2", 0.27, 4.2), IndicatorStatus::Normal);
        assert_eq!(assess("0.27", 0.27, 4.2), IndicatorStatus::Normal);
    }

    #[test]
    fn test_assess_blank_and_invalid() {
        assert_eq!(assess("", 0.27, 4.2), IndicatorStatus::NotEntered);
        assert_eq!(assess("  ", 0.27, 4.2), IndicatorStatus::NotEntered);
        assert_eq!(assess("阴性", 0.27, 4.2), IndicatorStatus::Invalid);
    }

    #[test]
    fn test_assess_reads_leading_number() {
        assert_eq!(assess("5.1↑", 0.27, 4.2), IndicatorStatus::High);
        assert_eq!(assess(".5", 0.27, 4.2), IndicatorStatus::Normal);
    }

    #[test]
    fn test_assess_indicator_defaults() {
        assert_eq!(assess_indicator(IndicatorKey::Tsh, "3.50"), IndicatorStatus::Normal);
        assert_eq!(assess_indicator(IndicatorKey::Ft4, "25"), IndicatorStatus::High);
        assert_eq!(assess_indicator(IndicatorKey::Calcium, "2.0"), IndicatorStatus::Low);
        assert_eq!(assess_indicator(IndicatorKey::TpoAb, "28.5"), IndicatorStatus::Unknown);
    }

    #[test]
    fn test_assess_with_range_reference() {
        assert_eq!(assess_with_reference("5.0", "0.27 - 4.2"), IndicatorStatus::High);
        assert_eq!(assess_with_reference("3.0", "0.27-4.2"), IndicatorStatus::Normal);
    }

    #[test]
    fn test_assess_with_open_references() {
        assert_eq!(assess_with_reference("40", "< 34"), IndicatorStatus::High);
        assert_eq!(assess_with_reference("12", "<34"), IndicatorStatus::Normal);
        assert_eq!(assess_with_reference("1.0", "> 1.5"), IndicatorStatus::Low);
        assert_eq!(assess_with_reference("900", "> 1.5"), IndicatorStatus::Normal);
    }

    #[test]
    fn test_assess_with_reference_falls_back_to_normal() {
        assert_eq!(assess_with_reference("", "0.27 - 4.2"), IndicatorStatus::Normal);
        assert_eq!(assess_with_reference("99", ""), IndicatorStatus::Normal);
        assert_eq!(assess_with_reference("99", "阴性"), IndicatorStatus::Normal);
        assert_eq!(assess_with_reference("99", "< abc"), IndicatorStatus::Normal);
    }

    #[test]
    fn test_lab_extraction_assess() {
        let mut lab = LabExtraction::default();
        lab.indicators.insert_once(
            IndicatorKey::Tsh,
            IndicatorValue {
                value: "5.8".into(),
                unit: Some("mIU/L".into()),
            },
        );
        lab.indicators.insert_once(
            IndicatorKey::TgAb,
            IndicatorValue {
                value: "50".into(),
                unit: None,
            },
        );

        let statuses = lab.assess();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[&IndicatorKey::Tsh], IndicatorStatus::High);
        assert!(statuses[&IndicatorKey::Tsh].is_abnormal());
        assert_eq!(statuses[&IndicatorKey::TgAb], IndicatorStatus::Unknown);
        assert_eq!(IndicatorStatus::High.to_string(), "偏高");
    }
}
