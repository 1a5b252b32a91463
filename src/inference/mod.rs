pub mod artifacts;
pub mod classifier;
pub mod predictor;
pub mod scaler;

pub use artifacts::*;
pub use classifier::*;
pub use predictor::*;
pub use scaler::*;

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating a model artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}
