//! Golden tests for report extraction.
//!
//! These tests verify lab and ultrasound extraction against known OCR outputs.

use std::collections::BTreeMap;

use thyroid_ocr_core::{Extractor, ReportMode};

/// Lab test case from golden file.
struct GoldenCase {
    id: &'static str,
    fragments: &'static [&'static str],
    expected: &'static [(&'static str, &'static str)],
    expected_count: usize,
}

fn get_lab_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "thyroid-function-panel",
            fragments: &[
                "采样时间:2024-01-08",
                "TSH",
                "2.15",
                "mIU/L",
                "FT3",
                "4.92",
                "pmol/L",
                "FT4",
                "15.3",
                "pmol/L",
            ],
            expected: &[
                ("TSH", "2.15"),
                ("TSH_unit", "mIU/L"),
                ("FT3", "4.92"),
                ("FT3_unit", "pmol/L"),
                ("FT4", "15.3"),
                ("FT4_unit", "pmol/L"),
                ("recordDate", "2024-01-08"),
            ],
            expected_count: 4,
        },
        GoldenCase {
            id: "free-and-total-hormones",
            fragments: &["FT3 5.2 T3 1.8 FT4 16.1 T4 98"],
            expected: &[("FT3", "5.2"), ("T3", "1.8"), ("FT4", "16.1"), ("T4", "98")],
            expected_count: 4,
        },
        GoldenCase {
            id: "antibodies-and-thyroglobulin",
            fragments: &["TPOAb 28.5 IU/mL", "TGAb 115 IU/mL", "Tg 3.2 ng/mL"],
            expected: &[
                ("TPOAb", "28.5"),
                ("TPOAb_unit", "IU/mL"),
                ("TGAb", "115"),
                ("TGAb_unit", "IU/mL"),
                ("Tg", "3.2"),
                ("Tg_unit", "ng/mL"),
            ],
            expected_count: 3,
        },
        GoldenCase {
            id: "calcitonin-and-electrolytes",
            fragments: &[
                "降钙素 3.2 pg/mL",
                "血钙 2.31 mmol/L",
                "血磷 1.10 mmol/L",
                "血镁 0.92 mmol/L",
                "PTH 45.6 pg/mL",
            ],
            expected: &[
                ("Calcitonin", "3.2"),
                ("Calcitonin_unit", "pg/mL"),
                ("Calcium", "2.31"),
                ("Calcium_unit", "mmol/L"),
                ("Phosphorus", "1.10"),
                ("Phosphorus_unit", "mmol/L"),
                ("Magnesium", "0.92"),
                ("Magnesium_unit", "mmol/L"),
                ("PTH", "45.6"),
                ("PTH_unit", "pg/mL"),
            ],
            expected_count: 5,
        },
        GoldenCase {
            id: "ocr-spaced-chinese-name",
            fragments: &["促 甲 状 腺 激 素", "：", "3.50"],
            expected: &[("TSH", "3.50")],
            expected_count: 1,
        },
        GoldenCase {
            id: "chinese-date-and-free-t4",
            fragments: &["报告时间 2023年11月2日", "游离T4 16.1"],
            expected: &[("FT4", "16.1"), ("recordDate", "2023-11-02")],
            expected_count: 2,
        },
        GoldenCase {
            id: "patient-header-noise",
            fragments: &["姓名:张三", "性别:女", "年龄:45岁"],
            expected: &[],
            expected_count: 0,
        },
    ]
}

fn expected_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_lab_golden_cases() {
    let extractor = Extractor::new();

    for case in get_lab_cases() {
        let report = extractor.extract(case.fragments, ReportMode::Lab);

        assert_eq!(
            report.indicators,
            expected_map(case.expected),
            "Case {}: indicator map mismatch",
            case.id
        );
        assert_eq!(
            report.count, case.expected_count,
            "Case {}: count mismatch",
            case.id
        );
        assert_eq!(
            report.raw_text,
            case.fragments.join(" ").replace('：', ":"),
            "Case {}: raw text mismatch",
            case.id
        );
    }
}

fn get_ultrasound_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "resected-right-lobe",
            fragments: &["右叶已切除", "左叶大小约40×12×11mm", "峡部厚2.5mm"],
            expected: &[
                ("thyroidRight", "已切除"),
                ("thyroidLeft", "40×12×11mm"),
                ("isthmus", "2.5mm"),
            ],
            expected_count: 3,
        },
        GoldenCase {
            id: "multiple-nodules-enlarged-nodes",
            fragments: &[
                "右叶大小约46×16×14mm,左叶大小约45×15×13mm。",
                "甲状腺多发结节,较大者位于左叶下极,大小约1.2×0.9cm",
                "C-TIRADS 4b",
                "颈部淋巴结肿大",
            ],
            expected: &[
                ("thyroidRight", "46×16×14mm"),
                ("thyroidLeft", "45×15×13mm"),
                ("noduleCount", "多发"),
                ("tiradsLevel", "4B"),
                ("noduleLocation", "左叶下极"),
                ("noduleMaxSize", "12×9mm"),
                ("lymphNode", "肿大"),
            ],
            expected_count: 7,
        },
        GoldenCase {
            id: "single-nodule-with-date",
            fragments: &[
                "检查日期:2024-05-16",
                "超声所见:",
                "甲状腺右叶大小约45×15×13mm,左叶大小约4.4×1.4×1.2cm,峡部厚约3mm。",
                "右叶中部见一个低回声结节,边界清,形态规则,内见点状强回声,大小约6.1×4.3mm。",
                "双侧颈部未见明显肿大淋巴结。",
                "超声提示: 甲状腺右叶实性结节 C-TIRADS 4a",
            ],
            expected: &[
                ("thyroidRight", "45×15×13mm"),
                ("thyroidLeft", "44×14×12mm"),
                ("isthmus", "3.0mm"),
                ("noduleCount", "1"),
                ("tiradsLevel", "4A"),
                ("noduleLocation", "右叶中部"),
                ("noduleMaxSize", "6.1×4.3mm"),
                ("noduleFeatures", "低回声、边界清、形态规则、点状钙化"),
                ("lymphNode", "未见异常"),
                ("ultrasoundDate", "2024-05-16"),
            ],
            expected_count: 10,
        },
    ]
}

#[test]
fn test_ultrasound_golden_cases() {
    let extractor = Extractor::new();

    for case in get_ultrasound_cases() {
        let report = extractor.extract(case.fragments, ReportMode::Ultrasound);

        let mut fields = report.indicators.clone();
        let note = fields.remove("ultrasoundNote");

        assert_eq!(
            fields,
            expected_map(case.expected),
            "Case {}: field map mismatch",
            case.id
        );
        assert_eq!(
            report.count, case.expected_count,
            "Case {}: count mismatch",
            case.id
        );
        assert_eq!(
            note.as_deref(),
            Some(report.raw_text.as_str()),
            "Case {}: note should hold the assembled text",
            case.id
        );
    }
}

#[test]
fn test_blank_input_needs_manual_entry() {
    let extractor = Extractor::new();
    let blank: &[&str] = &["", " "];

    for mode in [ReportMode::Lab, ReportMode::Ultrasound] {
        let report = extractor.extract(blank, mode);
        assert!(report.indicators.is_empty(), "mode {}", mode);
        assert!(report.needs_manual_entry(), "mode {}", mode);
    }
}

#[test]
fn test_mode_names() {
    let cases = vec![
        ("ultrasound", ReportMode::Ultrasound),
        ("ULTRASOUND", ReportMode::Ultrasound),
        ("lab", ReportMode::Lab),
        ("blood", ReportMode::Lab),
        ("", ReportMode::Lab),
    ];

    for (raw, expected) in cases {
        assert_eq!(
            ReportMode::parse_lenient(raw),
            expected,
            "Mode '{}' should parse as {}",
            raw,
            expected
        );
    }
}
