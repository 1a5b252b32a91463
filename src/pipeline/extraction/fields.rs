//! Regex extraction of clinical fields from free-form report text.
//!
//! Each field is an independent `(field, matcher, parser)` entry. The first
//! match per field wins; a value that fails to parse leaves the field absent.
//! No range validation happens here; the normalizer clamps later.

use std::sync::LazyLock;

use regex::Regex;

use super::types::ExtractedFields;
use crate::models::patient::Field;

/// Converts the captured text into a field value. `None` means skip the field.
type ValueParser = fn(&str) -> Option<f64>;

/// A compiled pattern for one field.
struct FieldPattern {
    field: Field,
    regex: Regex,
    parse: ValueParser,
}

const INTEGER: &str = r"(\d+)";
const DECIMAL: &str = r"(\d+(?:\.\d+)?)";
const YES_NO: &str = r"(yes|no|true|false)";

static FIELD_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        // Numeric fields
        pattern(Field::Age, r"aged?", INTEGER, parse_number),
        pattern(Field::Bmi, r"bmi|body\s*mass\s*index", DECIMAL, parse_number),
        pattern(Field::HeartRate, r"heart\s*rate|pulse(?:\s*rate)?", INTEGER, parse_number),
        pattern(Field::Glucose, r"glucose|blood\s*sugar", DECIMAL, parse_number),
        pattern(Field::TotChol, r"(?:total\s*)?cholesterol|tot\s*chol", DECIMAL, parse_number),
        pattern(Field::SysBp, r"systolic(?:\s*bp)?|sys\s*bp", DECIMAL, parse_number),
        pattern(Field::DiaBp, r"diastolic(?:\s*bp)?|dia\s*bp", DECIMAL, parse_number),
        pattern(
            Field::CigsPerDay,
            r"cigarettes(?:\s*per\s*day)?|cigs\s*per\s*day",
            DECIMAL,
            parse_number,
        ),
        pattern(
            Field::BpMeds,
            r"(?:bp|blood\s*pressure)\s*medications?|bp\s*meds",
            DECIMAL,
            parse_number,
        ),
        // Yes/no fields
        pattern(Field::CurrentSmoker, r"smoker|smoking", YES_NO, parse_yes_no),
        pattern(Field::PrevalentStroke, r"stroke|cva", YES_NO, parse_yes_no),
        pattern(Field::PrevalentHyp, r"hypertension|high\s*blood\s*pressure", YES_NO, parse_yes_no),
        pattern(Field::Diabetes, r"diabetes|diabetic", YES_NO, parse_yes_no),
    ]
});

/// Build `<label>[:\s]*<value>` for one field.
fn pattern(field: Field, labels: &str, value: &str, parse: ValueParser) -> FieldPattern {
    FieldPattern {
        field,
        regex: Regex::new(&format!(r"(?i)(?:{labels})[:\s]*{value}"))
            .expect("Invalid field extraction pattern"),
        parse,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_yes_no(raw: &str) -> Option<f64> {
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(1.0),
        "no" | "false" => Some(0.0),
        _ => None,
    }
}

/// Extract clinical fields from report text.
///
/// Never fails: an unrecognised document produces an empty result.
pub fn extract_medical_fields(text: &str) -> ExtractedFields {
    let text_lower = text.to_lowercase();
    let mut extracted = ExtractedFields::new();

    for fp in FIELD_PATTERNS.iter() {
        let Some(caps) = fp.regex.captures(&text_lower) else {
            continue;
        };
        let Some(raw) = caps.get(1) else {
            continue;
        };
        if let Some(value) = (fp.parse)(raw.as_str()) {
            extracted.insert(fp.field, value);
        }
    }

    if let Some(male) = detect_gender(&text_lower) {
        extracted.insert(Field::Male, male);
    }

    tracing::debug!(
        fields = extracted.len(),
        text_length = text.len(),
        "Medical field extraction complete"
    );

    extracted
}

/// `Some(1.0)` when only "male" appears, `Some(0.0)` when only "female"
/// appears, `None` when both or neither do.
///
/// Expects lower-cased text. The "male" inside "female" does not count.
fn detect_gender(text_lower: &str) -> Option<f64> {
    let has_female = text_lower.contains("female");
    let has_male = text_lower
        .match_indices("male")
        .any(|(i, _)| !text_lower[..i].ends_with("fe"));

    match (has_male, has_female) {
        (true, false) => Some(1.0),
        (false, true) => Some(0.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_one(text: &str, field: Field) -> Option<f64> {
        extract_medical_fields(text).get(field)
    }

    // ── Numeric round trips ─────────────────────────────────────

    #[test]
    fn numeric_fields_round_trip_primary_labels() {
        let cases = [
            ("Age", Field::Age, 45.0),
            ("BMI", Field::Bmi, 28.5),
            ("Heart Rate", Field::HeartRate, 75.0),
            ("Glucose", Field::Glucose, 110.0),
            ("Cholesterol", Field::TotChol, 220.0),
            ("Systolic", Field::SysBp, 130.0),
            ("Diastolic", Field::DiaBp, 85.0),
            ("Cigarettes", Field::CigsPerDay, 10.0),
            ("BP Medications", Field::BpMeds, 1.0),
        ];
        for (label, field, value) in cases {
            let text = format!("{label}: {value}");
            assert_eq!(extract_one(&text, field), Some(value), "label {label}");
        }
    }

    #[test]
    fn numeric_fields_round_trip_alternate_labels() {
        let cases = [
            ("Aged", Field::Age, 67.0),
            ("Body Mass Index", Field::Bmi, 31.2),
            ("Pulse", Field::HeartRate, 88.0),
            ("Blood Sugar", Field::Glucose, 142.5),
            ("Total Cholesterol", Field::TotChol, 250.0),
            ("Systolic BP", Field::SysBp, 145.0),
            ("Dia BP", Field::DiaBp, 92.0),
            ("Cigs per day", Field::CigsPerDay, 15.0),
            ("Blood Pressure Medication", Field::BpMeds, 0.0),
        ];
        for (label, field, value) in cases {
            let text = format!("{label}: {value}");
            assert_eq!(extract_one(&text, field), Some(value), "label {label}");
        }
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(extract_one("AGE: 52", Field::Age), Some(52.0));
        assert_eq!(extract_one("bmi 27.3", Field::Bmi), Some(27.3));
        assert_eq!(extract_one("HeArT rAtE:72", Field::HeartRate), Some(72.0));
    }

    #[test]
    fn decimal_values_keep_fraction() {
        assert_eq!(extract_one("Glucose: 99.75", Field::Glucose), Some(99.75));
    }

    #[test]
    fn integer_fields_stop_at_decimal_point() {
        assert_eq!(extract_one("Age: 52.5", Field::Age), Some(52.0));
    }

    #[test]
    fn first_match_wins() {
        let text = "Glucose: 110\nRepeat glucose: 180";
        assert_eq!(extract_one(text, Field::Glucose), Some(110.0));
    }

    #[test]
    fn no_range_validation_at_extraction() {
        assert_eq!(extract_one("Systolic: 400", Field::SysBp), Some(400.0));
    }

    #[test]
    fn label_without_number_is_absent() {
        let fields = extract_medical_fields("Cholesterol: pending\nBMI: n/a");
        assert!(!fields.contains(Field::TotChol));
        assert!(!fields.contains(Field::Bmi));
    }

    #[test]
    fn newline_between_label_and_value_allowed() {
        assert_eq!(extract_one("Diastolic:\n  82", Field::DiaBp), Some(82.0));
    }

    // ── Yes/no fields ───────────────────────────────────────────

    #[test]
    fn boolean_fields_round_trip() {
        let cases = [
            ("Smoker", "Smoking", Field::CurrentSmoker),
            ("Stroke", "CVA", Field::PrevalentStroke),
            ("Hypertension", "High Blood Pressure", Field::PrevalentHyp),
            ("Diabetes", "Diabetic", Field::Diabetes),
        ];
        for (primary, alternate, field) in cases {
            for label in [primary, alternate] {
                assert_eq!(extract_one(&format!("{label}: yes"), field), Some(1.0), "{label}");
                assert_eq!(extract_one(&format!("{label}: True"), field), Some(1.0), "{label}");
                assert_eq!(extract_one(&format!("{label}: NO"), field), Some(0.0), "{label}");
                assert_eq!(extract_one(&format!("{label}: false"), field), Some(0.0), "{label}");
            }
        }
    }

    #[test]
    fn boolean_without_answer_is_absent() {
        assert!(!extract_medical_fields("Diabetes: type 2").contains(Field::Diabetes));
    }

    #[test]
    fn parse_yes_no_rejects_other_words() {
        assert_eq!(parse_yes_no("maybe"), None);
        assert_eq!(parse_yes_no("YES"), Some(1.0));
    }

    #[test]
    fn parse_number_rejects_non_finite() {
        let huge = "9".repeat(400);
        assert_eq!(parse_number(&huge), None);
        assert_eq!(parse_number("12.5"), Some(12.5));
    }

    #[test]
    fn overflowing_number_silently_skipped() {
        let text = format!("Glucose: {}\nAge: 40", "9".repeat(400));
        let fields = extract_medical_fields(&text);
        assert!(!fields.contains(Field::Glucose));
        assert_eq!(fields.get(Field::Age), Some(40.0));
    }

    // ── Gender ──────────────────────────────────────────────────

    #[test]
    fn gender_male_only() {
        assert_eq!(extract_one("Gender: Male", Field::Male), Some(1.0));
    }

    #[test]
    fn gender_female_only() {
        assert_eq!(extract_one("Gender: Female", Field::Male), Some(0.0));
    }

    #[test]
    fn gender_both_is_unset() {
        let fields = extract_medical_fields("Patient: female. Father (male) had MI.");
        assert!(!fields.contains(Field::Male));
    }

    #[test]
    fn gender_neither_is_unset() {
        assert!(!extract_medical_fields("Age: 40").contains(Field::Male));
    }

    // ── Whole documents ─────────────────────────────────────────

    #[test]
    fn unrecognised_text_is_empty() {
        assert!(extract_medical_fields("Lorem ipsum dolor sit amet.").is_empty());
        assert!(extract_medical_fields("").is_empty());
    }

    #[test]
    fn short_report_extracts_expected_fields() {
        let fields = extract_medical_fields("Age: 52\nBMI: 27.3\nSmoker: yes\nGender: male");
        let expected: ExtractedFields = [
            (Field::Age, 52.0),
            (Field::Bmi, 27.3),
            (Field::CurrentSmoker, 1.0),
            (Field::Male, 1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(fields, expected);
    }

    #[test]
    fn full_sample_report() {
        let report = "Age: 45\nGender: Male\nBMI: 28.5\nHeart Rate: 75\nGlucose: 110\n\
                      Cholesterol: 220\nSystolic: 130\nDiastolic: 85\nSmoker: Yes\n\
                      Cigarettes: 10\nHypertension: No\nDiabetes: No\nStroke: No\n\
                      BP Medications: 0";
        let fields = extract_medical_fields(report);
        assert_eq!(fields.len(), 14);
        assert_eq!(fields.get(Field::HeartRate), Some(75.0));
        assert_eq!(fields.get(Field::TotChol), Some(220.0));
        assert_eq!(fields.get(Field::PrevalentHyp), Some(0.0));
        assert_eq!(fields.get(Field::BpMeds), Some(0.0));
        assert_eq!(fields.get(Field::Male), Some(1.0));
    }
}
