//! Thyroid ultrasound extraction.
//!
//! A fixed cascade of heuristics runs over the assembled text. Each step reads
//! the text and the finding so far and may fill fields that are still unset:
//!
//! 1. Lobe resection / absence
//! 2. Lobe sizes
//! 3. Isthmus thickness
//! 4. Nodule count
//! 5. TI-RADS grade
//! 6. Nodule location
//! 7. Nodule maximum size
//! 8. Nodule features
//! 9. Lymph node status
//! 10. Examination date

use std::sync::LazyLock;

use regex::Regex;

use super::date::DateNormalizer;
use super::size::{format_size, round_tenth, SIZE_EXPR};
use crate::models::{UltrasoundField, UltrasoundFinding};

/// Value written for a lobe that was resected or is not visualized.
pub const RESECTED: &str = "已切除";

/// Value written when multiple nodules are reported.
pub const MULTIPLE_NODULES: &str = "多发";

/// Value written for a neck scan without abnormal lymph nodes.
pub const LYMPH_NORMAL: &str = "未见异常";

/// Value prefix for enlarged lymph nodes.
pub const LYMPH_ENLARGED: &str = "肿大";

/// Separator between joined nodule features.
pub const FEATURE_SEPARATOR: &str = "、";

/// Nodule location phrase: lobe or isthmus, optionally with a pole/part.
const LOCATION: &str = r"(?:[左右](?:侧叶|叶|侧)|峡部)(?:中上|中下|[上中下])?[极部份段]?";

/// Terms that close a lobe description.
const CONCLUSION: &str = r"结论|提示|诊断|印象";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid ultrasound pattern")
}

static RIGHT_RESECTED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"右[侧叶][^左]*?(?:已切除|未见显示|缺如)"));
static LEFT_RESECTED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"左[侧叶][^右]*?(?:已切除|未见显示|缺如)"));

static RIGHT_LOBE: LazyLock<Regex> = LazyLock::new(|| compile(r"右[侧叶]"));
static LEFT_LOBE: LazyLock<Regex> = LazyLock::new(|| compile(r"左[侧叶]"));
static RIGHT_LOBE_END: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"左[侧叶]|峡部|{}", CONCLUSION)));
static LEFT_LOBE_END: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"右[侧叶]|峡部|{}", CONCLUSION)));

static ISTHMUS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)峡部[^0-9,。;]{0,10}?([0-9]+\.?[0-9]*)\s*(mm|cm|毫米|厘米)?")
});

static NODULE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([一二两三]|[0-9]+)\s*[个枚处]?[^,。;0-9]{0,6}?回声?结节"));

static TIRADS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)[C-]?TI-?RADS\s*(?:分类|分级)?[:\s]*([0-9IVⅠⅡⅢⅣⅤ]+[abc]?)")
});

static LOCATION_AFTER_LARGEST: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?:最大|较大)[^,。;]{{0,8}}?({})", LOCATION))
});
static LOCATION_BEFORE_LARGEST: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"({})[^,。;]{{0,12}}?(?:最大|较大)", LOCATION))
});
static LOCATION_NEAR_NODULE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"({})[^,。;]{{0,20}}?回声?结节", LOCATION))
});

static FINDINGS_START: LazyLock<Regex> = LazyLock::new(|| compile(r"超声所见|检查所见|所见"));
static FINDINGS_END: LazyLock<Regex> =
    LazyLock::new(|| compile(r"超声提示|检查结论|超声诊断|结论|诊断|印象|提示"));
static NODULE_SIZE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"大小(?:约|为)?[:\s]*({})", SIZE_EXPR)));
static LARGEST_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?:最大|较大)[^0-9。;]{{0,16}}?({})", SIZE_EXPR))
});

static ECHO: LazyLock<Regex> = LazyLock::new(|| compile(r"(?:低|高|等|混合|无)回声"));
static NO_CALCIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:未见|无)(?:明显)?(?:(?:微小?|点状|粗大?)?钙化|点状强回声)")
});
static ASPECT_RATIO: LazyLock<Regex> =
    LazyLock::new(|| compile(r"纵横比\s*(?:>|＞|大于)\s*1"));

static NECK_SCAN: LazyLock<Regex> = LazyLock::new(|| compile(r"颈部|淋巴结"));
static NOT_ENLARGED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"未见(?:明显)?(?:异常)?肿大"));
static RIGHT_NODE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"右[^左,。;]{{0,12}}?(?:较大|最大|大者)[^0-9左。;]{{0,8}}?({})",
        SIZE_EXPR
    ))
});
static LEFT_NODE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"左[^右,。;]{{0,12}}?(?:较大|最大|大者)[^0-9右。;]{{0,8}}?({})",
        SIZE_EXPR
    ))
});
static LYMPH_NORMAL_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"未见(?:明显)?(?:异常|肿大)|无异常|未探及(?:明显)?异常")
});

/// A cascade step: reads the text, fills gaps in the finding.
type Step = fn(&str, UltrasoundFinding) -> UltrasoundFinding;

const CASCADE: &[(&str, Step)] = &[
    ("resection", resection),
    ("lobe_size", lobe_sizes),
    ("isthmus", isthmus),
    ("nodule_count", nodule_count),
    ("tirads", tirads),
    ("nodule_location", nodule_location),
    ("nodule_max_size", nodule_max_size),
    ("nodule_features", nodule_features),
    ("lymph_node", lymph_node),
    ("date", examination_date),
];

/// Runs the ultrasound heuristic cascade.
#[derive(Default)]
pub struct UltrasoundExtractor;

impl UltrasoundExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every field the text supports. Blank text yields an empty finding.
    pub fn extract(&self, text: &str) -> UltrasoundFinding {
        if text.trim().is_empty() {
            return UltrasoundFinding::new();
        }

        let initial = UltrasoundFinding::new()
            .fill(UltrasoundField::UltrasoundNote, Some(text.to_string()));

        CASCADE.iter().fold(initial, |finding, (name, step)| {
            let before = finding.field_count();
            let finding = step(text, finding);
            if finding.field_count() > before {
                tracing::debug!(
                    step = *name,
                    fields = finding.field_count(),
                    "ultrasound step filled fields"
                );
            }
            finding
        })
    }
}

fn resection(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    let resected = |re: &Regex| re.is_match(text).then(|| RESECTED.to_string());
    finding
        .fill(UltrasoundField::ThyroidRight, resected(&*RIGHT_RESECTED))
        .fill(UltrasoundField::ThyroidLeft, resected(&*LEFT_RESECTED))
}

fn lobe_sizes(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    finding
        .fill(
            UltrasoundField::ThyroidRight,
            lobe_size(text, &RIGHT_LOBE, &RIGHT_LOBE_END),
        )
        .fill(
            UltrasoundField::ThyroidLeft,
            lobe_size(text, &LEFT_LOBE, &LEFT_LOBE_END),
        )
}

/// Size found between the lobe marker and the next boundary marker.
fn lobe_size(text: &str, marker: &Regex, boundary: &Regex) -> Option<String> {
    let start = marker.find(text)?.end();
    let rest = &text[start..];
    let segment = match boundary.find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    };
    format_size(segment)
}

fn isthmus(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    finding.fill(UltrasoundField::Isthmus, isthmus_thickness(text))
}

fn isthmus_thickness(text: &str) -> Option<String> {
    let caps = ISTHMUS.captures(text)?;
    let whole = caps.get(0)?;

    // A dimension or a counted nodule here is not the isthmus
    let after = text[whole.end()..].trim_start();
    if after.starts_with(['×', '*', 'x', 'X', '个', '枚', '处']) {
        return None;
    }

    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let centimeters = caps
        .get(2)
        .map(|u| matches!(u.as_str().to_lowercase().as_str(), "cm" | "厘米"))
        .unwrap_or(false);
    let mm = if centimeters { round_tenth(value * 10.0) } else { value };
    Some(format!("{:.1}mm", mm))
}

fn nodule_count(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    let count = if text.contains("多发") || text.contains("多个") {
        Some(MULTIPLE_NODULES.to_string())
    } else {
        count_before_nodule(text)
    };
    finding.fill(UltrasoundField::NoduleCount, count)
}

/// Count word or digit preceding a nodule mention, skipping numbers that belong
/// to a size (`5×4mm`).
fn count_before_nodule(text: &str) -> Option<String> {
    let mut start = 0;
    while let Some(caps) = NODULE_COUNT.captures_at(text, start) {
        let raw = caps.get(1)?;
        if !is_size_component(text, raw.start(), raw.end()) {
            return Some(match raw.as_str() {
                "一" => "1".to_string(),
                "二" | "两" => "2".to_string(),
                "三" => "3".to_string(),
                digits => digits.to_string(),
            });
        }
        start = raw.end();
    }
    None
}

fn is_size_component(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].trim_end();
    if before.ends_with(['×', '*', 'x', 'X']) {
        return true;
    }
    let after = text[end..].trim_start();
    let unit: String = after.chars().take(2).collect::<String>().to_lowercase();
    matches!(unit.as_str(), "mm" | "cm" | "毫米" | "厘米") || after.starts_with(['×', '*'])
}

fn tirads(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    finding.fill(UltrasoundField::TiradsLevel, highest_tirads(text))
}

/// The "highest" grade among all TI-RADS mentions.
///
/// Grades are compared as plain strings after upper-casing, so "IV" sorts above
/// "4" and "10" below "9". Downstream consumers rely on this ordering.
pub fn highest_tirads(text: &str) -> Option<String> {
    TIRADS
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|g| g.as_str().to_uppercase()))
        .max()
}

fn nodule_location(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    let location = [
        &*LOCATION_AFTER_LARGEST,
        &*LOCATION_BEFORE_LARGEST,
        &*LOCATION_NEAR_NODULE,
    ]
    .iter()
    .find_map(|re| re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()));
    finding.fill(UltrasoundField::NoduleLocation, location)
}

fn nodule_max_size(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    let in_findings = {
        let findings = findings_segment(text);
        findings
            .find("结节")
            .and_then(|at| NODULE_SIZE.captures(&findings[at..]))
            .and_then(|caps| caps.get(1))
            .and_then(|m| format_size(m.as_str()))
    };
    let size = in_findings.or_else(|| {
        LARGEST_SIZE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| format_size(m.as_str()))
    });
    finding.fill(UltrasoundField::NoduleMaxSize, size)
}

/// Text between the findings heading (or the start) and the conclusion heading (or the end).
fn findings_segment(text: &str) -> &str {
    let start = FINDINGS_START.find(text).map(|m| m.end()).unwrap_or(0);
    let rest = &text[start..];
    match FINDINGS_END.find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    }
}

fn nodule_features(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    let features = collect_features(text);
    let joined = (!features.is_empty()).then(|| features.join(FEATURE_SEPARATOR));
    finding.fill(UltrasoundField::NoduleFeatures, joined)
}

/// Echogenicity, border, shape, calcification and aspect ratio, in that order.
fn collect_features(text: &str) -> Vec<String> {
    let mut features = Vec::new();

    if let Some(echo) = ECHO.find(text) {
        features.push(echo.as_str().to_string());
    }

    if contains_any(text, &["边界不清", "边界欠清", "边界模糊"]) {
        features.push("边界不清".to_string());
    } else if text.contains("边界清") {
        features.push("边界清".to_string());
    }

    if contains_any(text, &["形态不规则", "形态欠规则"]) {
        features.push("形态不规则".to_string());
    } else if text.contains("形态规则") {
        features.push("形态规则".to_string());
    }

    let affirmed = NO_CALCIFICATION.replace_all(text, "");
    if contains_any(&affirmed, &["微钙化", "微小钙化"]) {
        features.push("微钙化".to_string());
    } else if contains_any(&affirmed, &["点状钙化", "点状强回声"]) {
        features.push("点状钙化".to_string());
    } else if contains_any(&affirmed, &["粗钙化", "粗大钙化"]) {
        features.push("粗钙化".to_string());
    } else if affirmed.contains("钙化") {
        features.push("见钙化".to_string());
    }

    if ASPECT_RATIO.is_match(text) {
        features.push("纵横比>1".to_string());
    }

    features
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

fn lymph_node(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    finding.fill(UltrasoundField::LymphNode, lymph_status(text))
}

fn lymph_status(text: &str) -> Option<String> {
    let segment = match NECK_SCAN.find(text) {
        Some(m) => &text[m.start()..],
        None => text,
    };

    let enlarged = NOT_ENLARGED.replace_all(segment, "").contains(LYMPH_ENLARGED);
    if enlarged {
        let side = |re: &Regex| {
            re.captures(segment)
                .and_then(|caps| caps.get(1))
                .and_then(|m| format_size(m.as_str()))
        };
        let mut status = LYMPH_ENLARGED.to_string();
        if let Some(right) = side(&*RIGHT_NODE) {
            status.push_str(&format!("，右{}", right));
        }
        if let Some(left) = side(&*LEFT_NODE) {
            status.push_str(&format!("，左{}", left));
        }
        return Some(status);
    }

    LYMPH_NORMAL_PHRASE
        .is_match(segment)
        .then(|| LYMPH_NORMAL.to_string())
}

fn examination_date(text: &str, finding: UltrasoundFinding) -> UltrasoundFinding {
    finding.fill(
        UltrasoundField::UltrasoundDate,
        DateNormalizer::ultrasound().normalize(text),
    )
}
