//! Lab panel models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire key under which the lab report date is emitted.
pub const RECORD_DATE_KEY: &str = "recordDate";

/// Suffix appended to an indicator key for its unit entry.
pub const UNIT_SUFFIX: &str = "_unit";

/// Named lab-panel value.
///
/// Declaration order is the rule priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndicatorKey {
    #[serde(rename = "TSH")]
    Tsh,
    #[serde(rename = "FT3")]
    Ft3,
    #[serde(rename = "FT4")]
    Ft4,
    #[serde(rename = "T3")]
    T3,
    #[serde(rename = "T4")]
    T4,
    #[serde(rename = "TPOAb")]
    TpoAb,
    #[serde(rename = "TGAb")]
    TgAb,
    #[serde(rename = "TRAb")]
    TrAb,
    #[serde(rename = "Tg")]
    Tg,
    Calcitonin,
    Calcium,
    Magnesium,
    Phosphorus,
    #[serde(rename = "PTH")]
    Pth,
}

impl IndicatorKey {
    /// All keys in priority order.
    pub const ALL: [IndicatorKey; 14] = [
        IndicatorKey::Tsh,
        IndicatorKey::Ft3,
        IndicatorKey::Ft4,
        IndicatorKey::T3,
        IndicatorKey::T4,
        IndicatorKey::TpoAb,
        IndicatorKey::TgAb,
        IndicatorKey::TrAb,
        IndicatorKey::Tg,
        IndicatorKey::Calcitonin,
        IndicatorKey::Calcium,
        IndicatorKey::Magnesium,
        IndicatorKey::Phosphorus,
        IndicatorKey::Pth,
    ];

    /// Key as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKey::Tsh => "TSH",
            IndicatorKey::Ft3 => "FT3",
            IndicatorKey::Ft4 => "FT4",
            IndicatorKey::T3 => "T3",
            IndicatorKey::T4 => "T4",
            IndicatorKey::TpoAb => "TPOAb",
            IndicatorKey::TgAb => "TGAb",
            IndicatorKey::TrAb => "TRAb",
            IndicatorKey::Tg => "Tg",
            IndicatorKey::Calcitonin => "Calcitonin",
            IndicatorKey::Calcium => "Calcium",
            IndicatorKey::Magnesium => "Magnesium",
            IndicatorKey::Phosphorus => "Phosphorus",
            IndicatorKey::Pth => "PTH",
        }
    }

    /// Look up a key by its wire name (exact match).
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extracted value with its optional unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorValue {
    /// Numeric text exactly as recognized (e.g. "3.50")
    pub value: String,
    /// Unit token following the value (e.g. "mIU/L")
    pub unit: Option<String>,
}

/// Indicator key → value map. A key is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIndicatorSet {
    values: BTreeMap<IndicatorKey, IndicatorValue>,
}

impl ExtractedIndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert only if the key is still unset. Returns whether the value was stored.
    pub fn insert_once(&mut self, key: IndicatorKey, value: IndicatorValue) -> bool {
        if self.values.contains_key(&key) {
            return false;
        }
        self.values.insert(key, value);
        true
    }

    pub fn get(&self, key: IndicatorKey) -> Option<&IndicatorValue> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: IndicatorKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndicatorKey, &IndicatorValue)> {
        self.values.iter()
    }
}

/// Result of lab-mode extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabExtraction {
    pub indicators: ExtractedIndicatorSet,
    /// Report date as `YYYY-MM-DD`
    pub record_date: Option<String>,
}

impl LabExtraction {
    /// Number of populated keys (indicators plus the date). Units are not counted.
    pub fn field_count(&self) -> usize {
        self.indicators.len() + usize::from(self.record_date.is_some())
    }

    /// Flatten to the wire map: `KEY` → value, `KEY_unit` → unit, `recordDate` → date.
    pub fn to_wire_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for (key, value) in self.indicators.iter() {
            map.insert(key.as_str().to_string(), value.value.clone());
            if let Some(unit) = &value.unit {
                map.insert(format!("{}{}", key.as_str(), UNIT_SUFFIX), unit.clone());
            }
        }
        if let Some(date) = &self.record_date {
            map.insert(RECORD_DATE_KEY.to_string(), date.clone());
        }
        map
    }
}
