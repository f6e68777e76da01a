//! Fragment assembly.
//!
//! Handles:
//! - Joining OCR fragments in provider order with a single space
//! - Full-width punctuation folding (（→(, ）→), ：→:, ，→,)

use std::collections::HashMap;

use crate::models::AssembledText;

/// Joins recognized fragments into one canonical string.
pub struct TextAssembler {
    /// Punctuation map: full-width → half-width
    punctuation: HashMap<char, char>,
}

impl Default for TextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAssembler {
    /// Create an assembler with the default punctuation map.
    pub fn new() -> Self {
        Self {
            punctuation: Self::default_punctuation(),
        }
    }

    /// Join fragments with a single space and fold punctuation.
    pub fn assemble<S: AsRef<str>>(&self, fragments: &[S]) -> AssembledText {
        let joined = fragments
            .iter()
            .map(|f| f.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        AssembledText::new(self.normalize_punctuation(&joined))
    }

    /// Replace every mapped full-width character with its half-width form.
    pub fn normalize_punctuation(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.punctuation.get(&c).copied().unwrap_or(c))
            .collect()
    }

    /// Add a custom punctuation mapping.
    pub fn add_mapping(&mut self, from: char, to: char) {
        self.punctuation.insert(from, to);
    }

    fn default_punctuation() -> HashMap<char, char> {
        HashMap::from([('（', '('), ('）', ')'), ('：', ':'), ('，', ',')])
    }
}
