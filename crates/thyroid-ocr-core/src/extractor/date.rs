//! Keyword-anchored report date extraction.
//!
//! Accepts `2024.3.5`, `2024-03-05`, `2024/3/5` and `2024年3月5日`. Only years
//! 2020–2029 are recognized; reports from other decades yield no date.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Keywords that introduce a date on lab reports.
pub const LAB_DATE_KEYWORDS: &[&str] = &["日期", "时间", "采样", "送检", "报告", "核收", "发布"];

/// Keywords that introduce a date on ultrasound reports.
pub const ULTRASOUND_DATE_KEYWORDS: &[&str] = &["日期", "时间"];

static LAB_DATES: LazyLock<DateNormalizer> =
    LazyLock::new(|| DateNormalizer::with_keywords(LAB_DATE_KEYWORDS));

static ULTRASOUND_DATES: LazyLock<DateNormalizer> =
    LazyLock::new(|| DateNormalizer::with_keywords(ULTRASOUND_DATE_KEYWORDS));

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid number pattern"));

/// Extracts the first keyword-anchored date as `YYYY-MM-DD`.
pub struct DateNormalizer {
    pattern: Regex,
}

impl DateNormalizer {
    /// Shared normalizer for lab panels.
    pub fn lab() -> &'static DateNormalizer {
        &LAB_DATES
    }

    /// Shared normalizer for ultrasound reports.
    pub fn ultrasound() -> &'static DateNormalizer {
        &ULTRASOUND_DATES
    }

    /// Build a normalizer anchored on the given keywords.
    pub fn with_keywords(keywords: &[&str]) -> Self {
        let anchors = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(?:{})[^0-9]*(202[0-9][.\-/年][0-1]?[0-9][.\-/月][0-3]?[0-9]日?)",
            anchors
        );
        Self {
            pattern: Regex::new(&pattern).expect("keywords are escaped"),
        }
    }

    /// Find the first keyword-anchored date and format it as `YYYY-MM-DD`.
    pub fn normalize(&self, text: &str) -> Option<String> {
        let token = self.pattern.captures(text)?.get(1)?.as_str();

        let parts: Vec<&str> = NUMBER.find_iter(token).map(|m| m.as_str()).collect();
        let [year, month, day] = parts.as_slice() else {
            return None;
        };

        let iso = format!("{}-{:0>2}-{:0>2}", year, month, day);
        if parse_iso_date(&iso).is_none() {
            tracing::debug!(date = %iso, "extracted date is not a valid calendar date");
        }
        Some(iso)
    }
}

/// Parse a normalized `YYYY-MM-DD` string into a calendar date.
pub fn parse_iso_date(iso: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()
}
