//! Patient record: the 14 clinical features consumed by the risk classifier.
//!
//! Field order is the classifier's feature order and must not change
//! without retraining the model artifact.

use serde::{Deserialize, Serialize};

/// Number of features in a patient record.
pub const FEATURE_COUNT: usize = 14;

/// One of the 14 clinical fields. Declaration order is feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "male")]
    Male,
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "currentSmoker")]
    CurrentSmoker,
    #[serde(rename = "cigsPerDay")]
    CigsPerDay,
    #[serde(rename = "BPMeds")]
    BpMeds,
    #[serde(rename = "prevalentStroke")]
    PrevalentStroke,
    #[serde(rename = "prevalentHyp")]
    PrevalentHyp,
    #[serde(rename = "diabetes")]
    Diabetes,
    #[serde(rename = "totChol")]
    TotChol,
    #[serde(rename = "sysBP")]
    SysBp,
    #[serde(rename = "diaBP")]
    DiaBp,
    #[serde(rename = "BMI")]
    Bmi,
    #[serde(rename = "heartRate")]
    HeartRate,
    #[serde(rename = "glucose")]
    Glucose,
}

/// How a field's value is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 0 or 1, entered as a yes/no (or male/female) choice.
    Binary,
    /// Whole number; fractional input is truncated.
    Integer,
    Continuous,
}

impl Field {
    /// All fields in feature order.
    pub const ALL: [Field; FEATURE_COUNT] = [
        Field::Male,
        Field::Age,
        Field::CurrentSmoker,
        Field::CigsPerDay,
        Field::BpMeds,
        Field::PrevalentStroke,
        Field::PrevalentHyp,
        Field::Diabetes,
        Field::TotChol,
        Field::SysBp,
        Field::DiaBp,
        Field::Bmi,
        Field::HeartRate,
        Field::Glucose,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Male => "male",
            Field::Age => "age",
            Field::CurrentSmoker => "currentSmoker",
            Field::CigsPerDay => "cigsPerDay",
            Field::BpMeds => "BPMeds",
            Field::PrevalentStroke => "prevalentStroke",
            Field::PrevalentHyp => "prevalentHyp",
            Field::Diabetes => "diabetes",
            Field::TotChol => "totChol",
            Field::SysBp => "sysBP",
            Field::DiaBp => "diaBP",
            Field::Bmi => "BMI",
            Field::HeartRate => "heartRate",
            Field::Glucose => "glucose",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// Position in the feature vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label used in the summary table.
    pub fn label(self) -> &'static str {
        match self {
            Field::Male => "Gender",
            Field::Age => "Age",
            Field::CurrentSmoker => "Current Smoker",
            Field::CigsPerDay => "Cigarettes/Day",
            Field::BpMeds => "BP Medications",
            Field::PrevalentStroke => "Previous Stroke",
            Field::PrevalentHyp => "Hypertension",
            Field::Diabetes => "Diabetes",
            Field::TotChol => "Total Cholesterol",
            Field::SysBp => "Systolic BP",
            Field::DiaBp => "Diastolic BP",
            Field::Bmi => "BMI",
            Field::HeartRate => "Heart Rate",
            Field::Glucose => "Glucose",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Male
            | Field::CurrentSmoker
            | Field::BpMeds
            | Field::PrevalentStroke
            | Field::PrevalentHyp
            | Field::Diabetes => FieldKind::Binary,
            Field::Age | Field::HeartRate => FieldKind::Integer,
            Field::CigsPerDay
            | Field::TotChol
            | Field::SysBp
            | Field::DiaBp
            | Field::Bmi
            | Field::Glucose => FieldKind::Continuous,
        }
    }

    /// Inclusive `(min, max)` accepted by the form.
    pub fn domain(self) -> (f64, f64) {
        match self {
            Field::Age => (1.0, 120.0),
            Field::CigsPerDay => (0.0, 100.0),
            Field::TotChol => (0.0, 600.0),
            Field::SysBp => (70.0, 250.0),
            Field::DiaBp => (40.0, 150.0),
            Field::Bmi => (10.0, 60.0),
            Field::HeartRate => (40.0, 200.0),
            Field::Glucose => (50.0, 500.0),
            _ => (0.0, 1.0),
        }
    }

    /// Clinical baseline used when neither the user nor the report supplies a value.
    pub fn baseline(self) -> f64 {
        match self {
            // The gender selector defaults to "Male".
            Field::Male => 1.0,
            Field::Age => 30.0,
            Field::TotChol => 200.0,
            Field::SysBp => 120.0,
            Field::DiaBp => 80.0,
            Field::Bmi => 25.0,
            Field::HeartRate => 70.0,
            Field::Glucose => 100.0,
            _ => 0.0,
        }
    }

    /// Whether `value` lies inside the field's domain.
    pub fn in_domain(self, value: f64) -> bool {
        let (min, max) = self.domain();
        value.is_finite() && value >= min && value <= max
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete, typed patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(with = "flag")]
    pub male: bool,
    pub age: u8,
    #[serde(rename = "currentSmoker", with = "flag")]
    pub current_smoker: bool,
    #[serde(rename = "cigsPerDay")]
    pub cigs_per_day: f64,
    #[serde(rename = "BPMeds")]
    pub bp_meds: u8,
    #[serde(rename = "prevalentStroke", with = "flag")]
    pub prevalent_stroke: bool,
    #[serde(rename = "prevalentHyp", with = "flag")]
    pub prevalent_hyp: bool,
    #[serde(with = "flag")]
    pub diabetes: bool,
    #[serde(rename = "totChol")]
    pub tot_chol: f64,
    #[serde(rename = "sysBP")]
    pub sys_bp: f64,
    #[serde(rename = "diaBP")]
    pub dia_bp: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "heartRate")]
    pub heart_rate: u16,
    pub glucose: f64,
}

impl PatientRecord {
    /// Record with every field at its clinical baseline.
    pub fn baseline() -> Self {
        Self::from_fn(Field::baseline)
    }

    /// Build a record from per-field numeric values.
    ///
    /// Values are expected to be in domain already; binary fields treat any
    /// non-zero value as 1 and integer fields are truncated.
    pub fn from_fn(mut value: impl FnMut(Field) -> f64) -> Self {
        let mut flag = |f: Field| value(f) != 0.0;
        let male = flag(Field::Male);
        let current_smoker = flag(Field::CurrentSmoker);
        let bp_meds = u8::from(flag(Field::BpMeds));
        let prevalent_stroke = flag(Field::PrevalentStroke);
        let prevalent_hyp = flag(Field::PrevalentHyp);
        let diabetes = flag(Field::Diabetes);
        Self {
            male,
            age: value(Field::Age).trunc() as u8,
            current_smoker,
            cigs_per_day: value(Field::CigsPerDay),
            bp_meds,
            prevalent_stroke,
            prevalent_hyp,
            diabetes,
            tot_chol: value(Field::TotChol),
            sys_bp: value(Field::SysBp),
            dia_bp: value(Field::DiaBp),
            bmi: value(Field::Bmi),
            heart_rate: value(Field::HeartRate).trunc() as u16,
            glucose: value(Field::Glucose),
        }
    }

    /// Numeric value of one field, booleans encoded as 0/1.
    pub fn value(&self, field: Field) -> f64 {
        let bit = |b: bool| if b { 1.0 } else { 0.0 };
        match field {
            Field::Male => bit(self.male),
            Field::Age => f64::from(self.age),
            Field::CurrentSmoker => bit(self.current_smoker),
            Field::CigsPerDay => self.cigs_per_day,
            Field::BpMeds => f64::from(self.bp_meds),
            Field::PrevalentStroke => bit(self.prevalent_stroke),
            Field::PrevalentHyp => bit(self.prevalent_hyp),
            Field::Diabetes => bit(self.diabetes),
            Field::TotChol => self.tot_chol,
            Field::SysBp => self.sys_bp,
            Field::DiaBp => self.dia_bp,
            Field::Bmi => self.bmi,
            Field::HeartRate => f64::from(self.heart_rate),
            Field::Glucose => self.glucose,
        }
    }

    /// Ordered feature vector for the classifier.
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        Field::ALL.map(|f| self.value(f))
    }

    /// First field whose value falls outside its domain, if any.
    pub fn first_out_of_range(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| !f.in_domain(self.value(*f)))
    }

    /// Value formatted for the summary table.
    pub fn display_value(&self, field: Field) -> String {
        let yes_no = |b: bool| if b { "Yes" } else { "No" }.to_string();
        match field {
            Field::Male => if self.male { "Male" } else { "Female" }.to_string(),
            Field::CurrentSmoker => yes_no(self.current_smoker),
            Field::PrevalentStroke => yes_no(self.prevalent_stroke),
            Field::PrevalentHyp => yes_no(self.prevalent_hyp),
            Field::Diabetes => yes_no(self.diabetes),
            other => format!("{}", self.value(other)),
        }
    }
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Serialize booleans as 0/1 so records match the classifier's encoding.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        match raw {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "expected 0 or 1, got {other}"
            ))),
        }
    }
}
