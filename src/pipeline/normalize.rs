//! Request normalization: merge user input, extracted report values and
//! clinical baselines into a complete, in-range patient record.
//!
//! Precedence per field: user override, then extracted value, then baseline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::patient::{Field, FieldKind, PatientRecord, FEATURE_COUNT};
use crate::pipeline::extraction::ExtractedFields;

#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: Field, value: String },

    #[error("Unknown choice for {field}: '{value}'")]
    UnknownChoice { field: Field, value: String },
}

/// A raw user-supplied value: a number from a JSON client or text from a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Number(v)
    }
}

impl From<&str> for InputValue {
    fn from(v: &str) -> Self {
        InputValue::Text(v.to_string())
    }
}

/// User-supplied values keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(BTreeMap<Field, InputValue>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<InputValue>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&InputValue> {
        self.0.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collect overrides from submitted form pairs.
    ///
    /// Keys that are not field names are ignored; blank values count as absent.
    pub fn from_form<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut overrides = Self::new();
        for (key, value) in pairs {
            let Some(field) = Field::from_str(key) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            overrides.set(field, value);
        }
        overrides
    }
}

/// A value moved into its field's domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub field: Field,
    pub original: f64,
    pub adjusted: f64,
}

impl std::fmt::Display for Adjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (min, max) = self.field.domain();
        write!(
            f,
            "{} {} outside {min}–{max}, using {}",
            self.field.label(),
            self.original,
            self.adjusted
        )
    }
}

/// Where a field's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    User,
    Report,
    Baseline,
}

/// Output of normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub record: PatientRecord,
    pub sources: BTreeMap<Field, ValueSource>,
    pub adjustments: Vec<Adjustment>,
}

/// Form defaults before the user edits anything: extracted values over baselines.
pub fn seed_defaults(extracted: &ExtractedFields) -> NormalizedRecord {
    merge(extracted, [None; FEATURE_COUNT])
}

/// Merge overrides, extraction and baselines into a complete record.
pub fn normalize(
    extracted: &ExtractedFields,
    overrides: &Overrides,
) -> Result<NormalizedRecord, NormalizeError> {
    let mut user = [None; FEATURE_COUNT];
    for field in Field::ALL {
        if let Some(input) = overrides.get(field) {
            user[field.index()] = resolve_input(field, input)?;
        }
    }
    Ok(merge(extracted, user))
}

fn merge(extracted: &ExtractedFields, user: [Option<f64>; FEATURE_COUNT]) -> NormalizedRecord {
    let mut values = [0.0; FEATURE_COUNT];
    let mut sources = BTreeMap::new();
    let mut adjustments = Vec::new();

    for field in Field::ALL {
        let (raw, source) = match (user[field.index()], extracted.get(field)) {
            (Some(v), _) => (v, ValueSource::User),
            (None, Some(v)) => (v, ValueSource::Report),
            (None, None) => (field.baseline(), ValueSource::Baseline),
        };

        let (value, clamped) = coerce(field, raw);
        if clamped {
            tracing::debug!(field = %field, original = raw, adjusted = value, "Value clamped to domain");
            adjustments.push(Adjustment {
                field,
                original: raw,
                adjusted: value,
            });
        }

        values[field.index()] = value;
        sources.insert(field, source);
    }

    NormalizedRecord {
        record: PatientRecord::from_fn(|f| values[f.index()]),
        sources,
        adjustments,
    }
}

/// Interpret one user-supplied value. `Ok(None)` means the input was blank.
fn resolve_input(field: Field, input: &InputValue) -> Result<Option<f64>, NormalizeError> {
    match input {
        InputValue::Number(n) if n.is_finite() => Ok(Some(*n)),
        InputValue::Number(n) => Err(NormalizeError::InvalidNumber {
            field,
            value: n.to_string(),
        }),
        InputValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match field.kind() {
                FieldKind::Binary => parse_choice(field, trimmed).map(Some),
                FieldKind::Integer | FieldKind::Continuous => trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(|| NormalizeError::InvalidNumber {
                        field,
                        value: trimmed.to_string(),
                    }),
            }
        }
    }
}

/// Map a yes/no (or male/female) choice to 0/1.
fn parse_choice(field: Field, choice: &str) -> Result<f64, NormalizeError> {
    match (field, choice.to_ascii_lowercase().as_str()) {
        (Field::Male, "male" | "m") => Ok(1.0),
        (Field::Male, "female" | "f") => Ok(0.0),
        (_, "yes" | "true" | "1") => Ok(1.0),
        (_, "no" | "false" | "0") => Ok(0.0),
        _ => Err(NormalizeError::UnknownChoice {
            field,
            value: choice.to_string(),
        }),
    }
}

/// Truncate whole-number fields and clamp into the field's domain.
/// The flag is set when clamping changed the value.
fn coerce(field: Field, raw: f64) -> (f64, bool) {
    let value = match field.kind() {
        FieldKind::Binary | FieldKind::Integer => raw.trunc(),
        FieldKind::Continuous => raw,
    };
    let (min, max) = field.domain();
    let clamped = value.clamp(min, max);
    (clamped, clamped != value)
}
