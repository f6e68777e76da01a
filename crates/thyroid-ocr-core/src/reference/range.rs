//! Built-in adult reference ranges.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::models::IndicatorKey;

static DEFAULT_RANGES: LazyLock<HashMap<IndicatorKey, ReferenceRange>> =
    LazyLock::new(default_ranges);

/// Normal interval for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
    /// Display name on Chinese lab sheets
    pub name: String,
}

impl ReferenceRange {
    pub fn new(min: f64, max: f64, unit: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            min,
            max,
            unit: unit.into(),
            name: name.into(),
        }
    }

    /// Built-in range for `key`, if one exists.
    pub fn for_key(key: IndicatorKey) -> Option<&'static ReferenceRange> {
        DEFAULT_RANGES.get(&key)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

fn default_ranges() -> HashMap<IndicatorKey, ReferenceRange> {
    use IndicatorKey::*;

    HashMap::from([
        (Tsh, ReferenceRange::new(0.27, 4.2, "mIU/L", "促甲状腺激素")),
        (Ft4, ReferenceRange::new(12.0, 22.0, "pmol/L", "游离甲状腺素")),
        (Ft3, ReferenceRange::new(3.1, 6.8, "pmol/L", "游离三碘甲状腺原氨酸")),
        (T3, ReferenceRange::new(1.3, 3.1, "nmol/L", "三碘甲状腺原氨酸")),
        (T4, ReferenceRange::new(66.0, 181.0, "nmol/L", "总甲状腺素")),
        (Tg, ReferenceRange::new(0.0, 77.0, "ng/mL", "甲状腺球蛋白")),
        (Calcium, ReferenceRange::new(2.11, 2.52, "mmol/L", "血钙")),
    ])
}
