//! Recognized text, before and after assembly.

use serde::{Deserialize, Serialize};

/// The canonical text produced by joining fragments and normalizing punctuation.
///
/// Immutable once built; every extractor reads from the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssembledText(String);

impl AssembledText {
    /// Wrap already-normalized text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the text holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The first `limit` characters (not bytes).
    pub fn truncated(&self, limit: usize) -> String {
        self.0.chars().take(limit).collect()
    }
}

impl AsRef<str> for AssembledText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
