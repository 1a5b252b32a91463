//! Startup loading of the classifier and scaler artifacts.
//!
//! Loading never fails hard: the outcome is a [`ModelState`] that is either
//! ready for prediction or unavailable with a reason. A missing scaler is
//! replaced by [`StandardScaler::fallback`] with a warning.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ArtifactError, Classifier, StandardScaler};

pub const FALLBACK_SCALER_WARNING: &str =
    "Scaler file not found. Using default scaler - predictions may be less accurate.";

/// Locations of the two artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path, classifier_file: &str, scaler_file: &str) -> Self {
        Self {
            classifier: dir.join(classifier_file),
            scaler: dir.join(scaler_file),
        }
    }
}

/// A usable classifier/scaler pair.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub classifier: Classifier,
    pub scaler: StandardScaler,
    /// True when the scaler was fitted on the embedded fallback dataset.
    pub fallback_scaler: bool,
    pub warnings: Vec<String>,
}

/// Outcome of artifact loading, held for the lifetime of the process.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(ModelArtifacts),
    Unavailable { reason: String },
}

impl ModelState {
    pub fn artifacts(&self) -> Option<&ModelArtifacts> {
        match self {
            ModelState::Ready(artifacts) => Some(artifacts),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn status(&self) -> ModelStatus {
        match self {
            ModelState::Ready(a) => ModelStatus::Ready {
                classifier_kind: a.classifier.kind(),
                probability_supported: a.classifier.supports_probability(),
                fallback_scaler: a.fallback_scaler,
                warnings: a.warnings.clone(),
            },
            ModelState::Unavailable { reason } => ModelStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }
}

/// Serializable summary of the model state for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelStatus {
    Ready {
        classifier_kind: &'static str,
        probability_supported: bool,
        fallback_scaler: bool,
        warnings: Vec<String>,
    },
    Unavailable {
        reason: String,
    },
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready { .. })
    }

    /// One-line banner text.
    pub fn headline(&self) -> &'static str {
        match self {
            ModelStatus::Ready { .. } => "Model and scaler loaded successfully",
            ModelStatus::Unavailable { .. } => "Error loading model or scaler",
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ArtifactError::NotFound(path.to_path_buf()),
        _ => ArtifactError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn load_classifier(path: &Path) -> Result<Classifier, ArtifactError> {
    let classifier: Classifier = read_json(path)?;
    classifier.validate()?;
    Ok(classifier)
}

pub fn load_scaler(path: &Path) -> Result<StandardScaler, ArtifactError> {
    let scaler: StandardScaler = read_json(path)?;
    scaler.validate()?;
    Ok(scaler)
}

/// Load both artifacts, substituting the fallback scaler when the scaler
/// file does not exist.
pub fn load_model_artifacts(paths: &ArtifactPaths) -> ModelState {
    let classifier = match load_classifier(&paths.classifier) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(path = %paths.classifier.display(), error = %e, "Failed to load classifier");
            return ModelState::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    let mut warnings = Vec::new();
    let (scaler, fallback_scaler) = match load_scaler(&paths.scaler) {
        Ok(s) => (s, false),
        Err(ArtifactError::NotFound(path)) => {
            tracing::warn!(path = %path.display(), "Scaler not found, fitting fallback scaler");
            warnings.push(FALLBACK_SCALER_WARNING.to_string());
            (StandardScaler::fallback(), true)
        }
        Err(e) => {
            tracing::error!(path = %paths.scaler.display(), error = %e, "Failed to load scaler");
            return ModelState::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    tracing::info!(
        kind = classifier.kind(),
        fallback_scaler,
        "Model artifacts loaded"
    );

    ModelState::Ready(ModelArtifacts {
        classifier,
        scaler,
        fallback_scaler,
        warnings,
    })
}
