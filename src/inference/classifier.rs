//! Linear binary classifiers loaded from JSON artifacts.
//!
//! ```json
//! { "kind": "logistic_regression", "coefficients": [...14], "intercept": -1.9 }
//! { "kind": "linear_svc", "coefficients": [...14], "intercept": 0.2 }
//! ```

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::models::patient::{Field, FEATURE_COUNT};

fn default_threshold() -> f64 {
    0.5
}

/// A trained binary classifier over scaled features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Sigmoid of a linear decision function; supports probabilities.
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
    /// Sign of a linear decision function; no probability output.
    LinearSvc {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
}

impl Classifier {
    fn weights(&self) -> (&[f64], f64) {
        match self {
            Classifier::LogisticRegression {
                coefficients,
                intercept,
                ..
            }
            | Classifier::LinearSvc {
                coefficients,
                intercept,
                ..
            } => (coefficients, *intercept),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            Classifier::LogisticRegression { feature_names, .. }
            | Classifier::LinearSvc { feature_names, .. } => feature_names.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression { .. } => "logistic_regression",
            Classifier::LinearSvc { .. } => "linear_svc",
        }
    }

    /// Whether [`Classifier::predict_proba`] yields a value.
    pub fn supports_probability(&self) -> bool {
        matches!(self, Classifier::LogisticRegression { .. })
    }

    /// Check the artifact matches the patient feature layout.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let (coefficients, intercept) = self.weights();
        if coefficients.len() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid(format!(
                "classifier has {} coefficients, records have {FEATURE_COUNT} features",
                coefficients.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::Invalid(
                "classifier weights must be finite".into(),
            ));
        }
        if let Classifier::LogisticRegression { threshold, .. } = self {
            if !(0.0..=1.0).contains(threshold) {
                return Err(ArtifactError::Invalid(format!(
                    "threshold {threshold} outside [0, 1]"
                )));
            }
        }
        if let Some(names) = self.feature_names() {
            let expected: Vec<&str> = Field::ALL.iter().map(|f| f.as_str()).collect();
            if names.iter().map(String::as_str).ne(expected.iter().copied()) {
                return Err(ArtifactError::Invalid(format!(
                    "feature order {names:?} does not match {expected:?}"
                )));
            }
        }
        Ok(())
    }

    /// Linear decision value for one scaled feature vector.
    pub fn decision_function(&self, scaled: &[f64]) -> Result<f64, String> {
        let (coefficients, intercept) = self.weights();
        if scaled.len() != coefficients.len() {
            return Err(format!(
                "classifier expects {} features, got {}",
                coefficients.len(),
                scaled.len()
            ));
        }
        let z = coefficients
            .iter()
            .zip(scaled)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + intercept;
        if z.is_finite() {
            Ok(z)
        } else {
            Err("decision function is not finite".into())
        }
    }

    /// Positive-class probability, or `None` when the model has no
    /// probability output.
    pub fn predict_proba(&self, scaled: &[f64]) -> Result<Option<f64>, String> {
        match self {
            Classifier::LogisticRegression { .. } => {
                let z = self.decision_function(scaled)?;
                Ok(Some(sigmoid(z)))
            }
            Classifier::LinearSvc { .. } => Ok(None),
        }
    }

    /// Class label: 1 for elevated risk, 0 otherwise.
    pub fn predict(&self, scaled: &[f64]) -> Result<u8, String> {
        match self {
            Classifier::LogisticRegression { threshold, .. } => {
                let z = self.decision_function(scaled)?;
                Ok(u8::from(sigmoid(z) >= *threshold))
            }
            Classifier::LinearSvc { .. } => {
                let z = self.decision_function(scaled)?;
                Ok(u8::from(z > 0.0))
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
