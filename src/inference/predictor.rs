//! Risk prediction over a complete patient record.

use serde::Serialize;
use thiserror::Error;

use super::ModelState;
use crate::models::patient::{Field, PatientRecord};

#[derive(Error, Debug, PartialEq)]
pub enum PredictionError {
    #[error("Model or scaler not loaded. Prediction unavailable.")]
    ModelUnavailable,

    #[error("{0} is outside its valid range")]
    InvalidRecord(Field),

    #[error("Scaling failed: {0}")]
    Scaling(String),

    #[error("Error making prediction: {0}")]
    Inference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }

    pub fn class(self) -> u8 {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::High => 1,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low Risk",
            RiskLabel::High => "High Risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: RiskLabel,
    /// Positive-class probability in [0, 1], when the classifier provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl Prediction {
    /// Probability as a percentage with two decimals, e.g. `12.34%`.
    pub fn probability_percent(&self) -> Option<String> {
        self.probability.map(|p| format!("{:.2}%", p * 100.0))
    }
}

/// Scale the record and run the classifier.
pub fn predict(state: &ModelState, record: &PatientRecord) -> Result<Prediction, PredictionError> {
    let artifacts = state.artifacts().ok_or(PredictionError::ModelUnavailable)?;

    if let Some(field) = record.first_out_of_range() {
        return Err(PredictionError::InvalidRecord(field));
    }

    let scaled = artifacts
        .scaler
        .transform(&record.to_features())
        .map_err(PredictionError::Scaling)?;

    let class = artifacts
        .classifier
        .predict(&scaled)
        .map_err(PredictionError::Inference)?;
    let probability = artifacts
        .classifier
        .predict_proba(&scaled)
        .map_err(PredictionError::Inference)?;

    if let Some(p) = probability {
        if !(0.0..=1.0).contains(&p) {
            return Err(PredictionError::Inference(format!(
                "probability {p} outside [0, 1]"
            )));
        }
    }

    let prediction = Prediction {
        label: RiskLabel::from_class(class),
        probability,
    };
    tracing::info!(
        class = prediction.label.class(),
        label = prediction.label.display(),
        probability = ?prediction.probability,
        "Prediction complete"
    );
    Ok(prediction)
}
