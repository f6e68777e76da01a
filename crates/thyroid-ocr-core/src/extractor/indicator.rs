//! Lab panel extraction via an ordered table of disambiguation rules.
//!
//! Rule order (highest priority first):
//! TSH, FT3, FT4, T3, T4, TPOAb, TGAb, TRAb, Tg, Calcitonin, Calcium, Magnesium,
//! Phosphorus, PTH.
//!
//! Families whose names contain each other (T3/FT3, T4/FT4, Tg/TGAb,
//! Calcium/Calcitonin) are kept apart by excluded prefixes: a candidate match
//! is rejected when the text just before it ends with one of the rule's
//! prefixes, and the search resumes right after the rejected start.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ExtractedIndicatorSet, IndicatorKey, IndicatorValue};

/// Separator and value shared by every rule. Group 1 is the value.
const VALUE: &str = r"[:：\s]*([0-9]+\.?[0-9]*)";

/// Optional unit token. Group 2 is the unit.
const UNIT: &str = r"(?:\s*([mµμu]IU/m?L|IU/m?L|k?U/m?L|[pnµμm]mol/L|[pnµμ]g/m?L|mg/dL))?";

static RULES: LazyLock<Vec<IndicatorRule>> = LazyLock::new(default_rules);

/// One entry of the rule table.
pub struct IndicatorRule {
    pub key: IndicatorKey,
    /// Name alternatives followed by value and optional unit
    primary: Regex,
    /// Lowercase prefixes that disqualify a candidate match
    excluded_prefixes: &'static [&'static str],
}

impl IndicatorRule {
    fn new(key: IndicatorKey, names: &[String], excluded_prefixes: &'static [&'static str]) -> Self {
        let pattern = format!("(?i)(?:{}){}{}", names.join("|"), VALUE, UNIT);
        Self {
            key,
            primary: Regex::new(&pattern).expect("indicator names are escaped"),
            excluded_prefixes,
        }
    }

    /// First non-excluded match in `text`.
    pub fn find(&self, text: &str) -> Option<IndicatorValue> {
        let mut start = 0;
        while start <= text.len() {
            let caps = self.primary.captures_at(text, start)?;
            let whole = caps.get(0)?;

            if !self.is_excluded(&text[..whole.start()]) {
                return Some(IndicatorValue {
                    value: caps.get(1)?.as_str().to_string(),
                    unit: caps.get(2).map(|u| u.as_str().to_string()),
                });
            }

            tracing::trace!(key = %self.key, at = whole.start(), "candidate rejected by prefix");
            start = next_char_boundary(text, whole.start());
        }
        None
    }

    fn is_excluded(&self, before: &str) -> bool {
        if self.excluded_prefixes.is_empty() {
            return false;
        }
        let before = before.trim_end().to_lowercase();
        self.excluded_prefixes.iter().any(|&prefix| {
            before.strip_suffix(prefix).is_some_and(|rest| {
                // A Latin prefix must start a word: "Ref T3" is not "F T3"
                !(prefix.starts_with(|c: char| c.is_ascii_alphabetic())
                    && rest.ends_with(|c: char| c.is_ascii_alphabetic()))
            })
        })
    }
}

/// Applies the rule table to assembled text.
pub struct IndicatorExtractor {
    rules: &'static [IndicatorRule],
}

impl Default for IndicatorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorExtractor {
    /// Create an extractor over the built-in rule table.
    pub fn new() -> Self {
        Self { rules: &RULES }
    }

    /// Try each rule once, in order. A key already present is never overwritten.
    pub fn extract(&self, text: &str) -> ExtractedIndicatorSet {
        let mut set = ExtractedIndicatorSet::new();
        for rule in self.rules {
            if set.contains(rule.key) {
                continue;
            }
            if let Some(value) = rule.find(text) {
                tracing::debug!(key = %rule.key, value = %value.value, "indicator matched");
                set.insert_once(rule.key, value);
            }
        }
        set
    }

    /// The rule table in priority order.
    pub fn rules(&self) -> &[IndicatorRule] {
        self.rules
    }
}

/// Escape `term` and allow optional whitespace between every character.
fn spaced(term: &str) -> String {
    term.chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect::<Vec<_>>()
        .join(r"\s*")
}

/// Chinese names and two-letter codes tolerate OCR spacing. Longer Latin codes
/// (FT3, TSH, PTH) must be contiguous.
fn names(terms: &[&str]) -> Vec<String> {
    terms
        .iter()
        .map(|t| {
            if t.is_ascii() && t.len() > 2 {
                regex::escape(t)
            } else {
                spaced(t)
            }
        })
        .collect()
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map(|c| at + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

fn default_rules() -> Vec<IndicatorRule> {
    use IndicatorKey::*;

    let mut tpo = vec![r"TPO-?Ab".to_string()];
    tpo.extend(names(&["TPO抗体", "抗甲状腺过氧化物酶抗体", "抗甲状腺过氧化物酶", "抗甲状腺过氧化物"]));

    let mut tgab = vec![
        r"TG-?Ab".to_string(),
        r"Anti-?TG(?:-?Ab)?".to_string(),
        r"A-TG".to_string(),
    ];
    tgab.extend(names(&["TG抗体", "抗甲状腺球蛋白抗体", "抗甲状腺球蛋白"]));

    let mut trab = vec![r"TR-?Ab".to_string()];
    trab.extend(names(&["TSH受体抗体", "促甲状腺激素受体抗体", "促甲状腺素受体抗体"]));

    let mut calcium = vec![r"Ca2\+".to_string()];
    calcium.extend(names(&["Calcium", "血钙", "钙", "Ca"]));

    let mut magnesium = vec![r"Mg2\+".to_string()];
    magnesium.extend(names(&["Magnesium", "血镁", "镁", "Mg"]));

    vec![
        IndicatorRule::new(Tsh, &names(&["TSH", "促甲状腺激素", "促甲状腺素"]), &[]),
        IndicatorRule::new(Ft3, &names(&["FT3", "游离T3", "游离三碘甲状腺原氨酸", "游离三碘"]), &[]),
        IndicatorRule::new(Ft4, &names(&["FT4", "游离T4", "游离甲状腺素"]), &[]),
        IndicatorRule::new(T3, &names(&["T3", "总T3"]), &["游离", "free", "f"]),
        IndicatorRule::new(T4, &names(&["T4", "总T4"]), &["游离", "free", "f"]),
        IndicatorRule::new(TpoAb, &tpo, &[]),
        IndicatorRule::new(TgAb, &tgab, &[]),
        IndicatorRule::new(TrAb, &trab, &[]),
        IndicatorRule::new(Tg, &names(&["Tg", "甲状腺球蛋白"]), &["抗", "anti", "anti-", "a-"]),
        IndicatorRule::new(Calcitonin, &names(&["Calcitonin", "降钙素"]), &[]),
        IndicatorRule::new(Calcium, &calcium, &["降"]),
        IndicatorRule::new(Magnesium, &magnesium, &[]),
        IndicatorRule::new(Phosphorus, &names(&["Phosphorus", "无机磷", "血磷", "磷"]), &[]),
        IndicatorRule::new(Pth, &names(&["iPTH", "PTH", "甲状旁腺激素", "甲状旁腺素"]), &[]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> ExtractedIndicatorSet {
        IndicatorExtractor::new().extract(text)
    }

    fn value_of(set: &ExtractedIndicatorSet, key: IndicatorKey) -> Option<&str> {
        set.get(key).map(|v| v.value.as_str())
    }

    #[test]
    fn test_rule_table_order() {
        let keys: Vec<IndicatorKey> = IndicatorExtractor::new().rules().iter().map(|r| r.key).collect();
        assert_eq!(keys, IndicatorKey::ALL.to_vec());
    }

    #[test]
    fn test_free_and_total_t3_kept_apart() {
        let set = extract("FT3 5.2 T3 1.8");
        assert_eq!(value_of(&set, IndicatorKey::Ft3), Some("5.2"));
        assert_eq!(value_of(&set, IndicatorKey::T3), Some("1.8"));
    }

    #[test]
    fn test_free_prefix_excludes_t3() {
        let set = extract("游离T3 4.5 总T3 1.8");
        assert_eq!(value_of(&set, IndicatorKey::Ft3), Some("4.5"));
        assert_eq!(value_of(&set, IndicatorKey::T3), Some("1.8"));

        let set = extract("Free T3 4.5");
        assert_eq!(value_of(&set, IndicatorKey::T3), None);
    }

    #[test]
    fn test_word_ending_in_f_is_not_free_prefix() {
        let set = extract("Ref T3 1.8");
        assert_eq!(value_of(&set, IndicatorKey::T3), Some("1.8"));
        assert_eq!(value_of(&set, IndicatorKey::Ft3), None);
    }

    #[test]
    fn test_free_prefix_excludes_t4() {
        let set = extract("游离T4 16.1 Free T4 15.0");
        assert_eq!(value_of(&set, IndicatorKey::Ft4), Some("16.1"));
        assert_eq!(value_of(&set, IndicatorKey::T4), None);

        let set = extract("FT4 16.1 总T4 98.2");
        assert_eq!(value_of(&set, IndicatorKey::T4), Some("98.2"));
    }

    #[test]
    fn test_thyroglobulin_vs_antibody() {
        let set = extract("Tg 10 TGAb 50");
        assert_eq!(value_of(&set, IndicatorKey::Tg), Some("10"));
        assert_eq!(value_of(&set, IndicatorKey::TgAb), Some("50"));
    }

    #[test]
    fn test_thyroglobulin_antibody_only() {
        let set = extract("抗甲状腺球蛋白抗体 115.4 A-TG 12");
        assert_eq!(value_of(&set, IndicatorKey::TgAb), Some("115.4"));
        assert_eq!(value_of(&set, IndicatorKey::Tg), None);
    }

    #[test]
    fn test_hyphenated_anti_tg_is_antibody() {
        let set = extract("Anti-TG 50 Tg 3.1");
        assert_eq!(value_of(&set, IndicatorKey::TgAb), Some("50"));
        assert_eq!(value_of(&set, IndicatorKey::Tg), Some("3.1"));

        let set = extract("Anti-TG-Ab 12.5 IU/mL");
        assert_eq!(value_of(&set, IndicatorKey::TgAb), Some("12.5"));
        assert_eq!(value_of(&set, IndicatorKey::Tg), None);
    }

    #[test]
    fn test_calcitonin_not_read_as_calcium() {
        let set = extract("降钙素 3.2 pg/mL");
        assert_eq!(value_of(&set, IndicatorKey::Calcitonin), Some("3.2"));
        assert_eq!(value_of(&set, IndicatorKey::Calcium), None);

        let set = extract("降钙素 3.2 血钙 2.31 mmol/L");
        assert_eq!(value_of(&set, IndicatorKey::Calcium), Some("2.31"));
        assert_eq!(
            set.get(IndicatorKey::Calcium).unwrap().unit.as_deref(),
            Some("mmol/L")
        );
    }

    #[test]
    fn test_ocr_spacing_tolerated() {
        let set = extract("促 甲 状 腺 激 素 ： 2.15 mIU/L");
        assert_eq!(value_of(&set, IndicatorKey::Tsh), Some("2.15"));
        assert_eq!(set.get(IndicatorKey::Tsh).unwrap().unit.as_deref(), Some("mIU/L"));
    }

    #[test]
    fn test_trab_not_read_as_tsh() {
        let set = extract("促甲状腺激素受体抗体 1.2 IU/L");
        assert_eq!(value_of(&set, IndicatorKey::TrAb), Some("1.2"));
        assert_eq!(value_of(&set, IndicatorKey::Tsh), None);
    }

    #[test]
    fn test_electrolytes_and_pth() {
        let set = extract("血镁 0.92 mmol/L 无机磷 1.10 mmol/L PTH 45.6 pg/mL");
        assert_eq!(value_of(&set, IndicatorKey::Magnesium), Some("0.92"));
        assert_eq!(value_of(&set, IndicatorKey::Phosphorus), Some("1.10"));
        assert_eq!(value_of(&set, IndicatorKey::Pth), Some("45.6"));
        assert_eq!(set.get(IndicatorKey::Pth).unwrap().unit.as_deref(), Some("pg/mL"));
    }

    #[test]
    fn test_antibodies() {
        let set = extract("TPOAb: 28.5 IU/mL TRAb 0.8");
        assert_eq!(value_of(&set, IndicatorKey::TpoAb), Some("28.5"));
        assert_eq!(
            set.get(IndicatorKey::TpoAb).unwrap().unit.as_deref(),
            Some("IU/mL")
        );
        assert_eq!(value_of(&set, IndicatorKey::TrAb), Some("0.8"));
    }

    #[test]
    fn test_first_match_wins() {
        let set = extract("TSH 3.50 TSH 9.99");
        assert_eq!(value_of(&set, IndicatorKey::Tsh), Some("3.50"));
    }

    #[test]
    fn test_noise_yields_nothing() {
        assert!(extract("").is_empty());
        assert!(extract("姓名 张三 性别 男 科室 内分泌科").is_empty());
    }
}
