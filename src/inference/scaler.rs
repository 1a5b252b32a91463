//! Standard feature scaler: `(x - mean) / scale` per feature.

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::models::patient::FEATURE_COUNT;

/// Synthetic rows spanning plausible minimum/maximum values for each feature,
/// in feature order. Used to fit a replacement scaler when no fitted scaler
/// artifact is available.
pub const FALLBACK_DATASET: [[f64; FEATURE_COUNT]; 4] = [
    // male, age, currentSmoker, cigsPerDay, BPMeds, prevalentStroke, prevalentHyp,
    // diabetes, totChol, sysBP, diaBP, BMI, heartRate, glucose
    [0.0, 30.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 150.0, 100.0, 60.0, 18.0, 50.0, 70.0],
    [1.0, 70.0, 1.0, 20.0, 1.0, 1.0, 1.0, 1.0, 300.0, 180.0, 110.0, 40.0, 120.0, 200.0],
    [0.0, 45.0, 0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 200.0, 120.0, 80.0, 25.0, 70.0, 100.0],
    [1.0, 55.0, 1.0, 10.0, 1.0, 0.0, 1.0, 0.0, 250.0, 140.0, 90.0, 30.0, 80.0, 120.0],
];

/// Fitted standardization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on `rows` using population mean and standard deviation.
    ///
    /// A feature with zero variance gets scale 1 so it maps to 0.
    pub fn fit<const N: usize>(rows: &[[f64; N]]) -> Result<Self, ArtifactError> {
        if rows.is_empty() {
            return Err(ArtifactError::Invalid(
                "cannot fit scaler on empty data".into(),
            ));
        }
        let n = rows.len() as f64;

        let mean: Vec<f64> = (0..N)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect();

        let scale = (0..N)
            .map(|j| {
                let var = rows.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std == 0.0 {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    /// Scaler fitted on [`FALLBACK_DATASET`].
    pub fn fallback() -> Self {
        Self::fit(&FALLBACK_DATASET).unwrap_or_else(|_| Self {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Check the parameters form a usable transform.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.len() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid(format!(
                "scaler expects {} features, records have {FEATURE_COUNT}",
                self.mean.len()
            )));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ArtifactError::Invalid("scaler mean is not finite".into()));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ArtifactError::Invalid(
                "scaler scale must be finite and non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Standardize one feature vector.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, String> {
        if features.len() != self.n_features() {
            return Err(format!(
                "expected {} features, got {}",
                self.n_features(),
                features.len()
            ));
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
