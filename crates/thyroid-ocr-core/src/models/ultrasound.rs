//! Ultrasound report models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural field reported for a thyroid ultrasound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UltrasoundField {
    ThyroidLeft,
    ThyroidRight,
    Isthmus,
    NoduleCount,
    NoduleLocation,
    NoduleMaxSize,
    TiradsLevel,
    NoduleFeatures,
    LymphNode,
    UltrasoundDate,
    /// Verbatim assembled text; not counted as an extracted field
    UltrasoundNote,
}

impl UltrasoundField {
    /// Field name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            UltrasoundField::ThyroidLeft => "thyroidLeft",
            UltrasoundField::ThyroidRight => "thyroidRight",
            UltrasoundField::Isthmus => "isthmus",
            UltrasoundField::NoduleCount => "noduleCount",
            UltrasoundField::NoduleLocation => "noduleLocation",
            UltrasoundField::NoduleMaxSize => "noduleMaxSize",
            UltrasoundField::TiradsLevel => "tiradsLevel",
            UltrasoundField::NoduleFeatures => "noduleFeatures",
            UltrasoundField::LymphNode => "lymphNode",
            UltrasoundField::UltrasoundDate => "ultrasoundDate",
            UltrasoundField::UltrasoundNote => "ultrasoundNote",
        }
    }
}

impl fmt::Display for UltrasoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated ultrasound fields.
///
/// Every field is optional and write-once: the first step to set a field owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UltrasoundFinding {
    fields: BTreeMap<UltrasoundField, String>,
}

impl UltrasoundFinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `field` with `value` if the field is still unset and a value was found.
    pub fn fill(mut self, field: UltrasoundField, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.fields.entry(field).or_insert(value);
        }
        self
    }

    pub fn get(&self, field: UltrasoundField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_set(&self, field: UltrasoundField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Number of extracted fields, excluding the raw note.
    pub fn field_count(&self) -> usize {
        self.fields
            .keys()
            .filter(|f| **f != UltrasoundField::UltrasoundNote)
            .count()
    }

    pub fn to_wire_map(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.clone()))
            .collect()
    }
}
