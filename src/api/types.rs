//! Shared state and JSON payloads for the web layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::inference::{ModelState, Prediction};
use crate::models::patient::PatientRecord;
use crate::pipeline::extraction::{DocumentReader, ExtractedFields, PdfTextExtractor};
use crate::pipeline::normalize::Overrides;

// ═══════════════════════════════════════════════════════════
// App context: shared read-only state for all handlers
// ═══════════════════════════════════════════════════════════

/// Loaded once at startup and shared by every request. Nothing in here is
/// mutated after construction.
#[derive(Clone)]
pub struct AppContext {
    pub model: Arc<ModelState>,
    pub reader: Arc<DocumentReader<PdfTextExtractor>>,
    pub config: Arc<AppConfig>,
}

impl AppContext {
    pub fn new(model: ModelState, config: AppConfig) -> Self {
        let reader = DocumentReader::new(PdfTextExtractor, config.max_upload_bytes());
        Self {
            model: Arc::new(model),
            reader: Arc::new(reader),
            config: Arc::new(config),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// JSON payloads
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub fields: ExtractedFields,
    pub found: usize,
}

/// `POST /api/assess` body. `text` is optional report text; `overrides`
/// holds user-entered values keyed by column name.
#[derive(Debug, Default, Deserialize)]
pub struct AssessRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub overrides: Overrides,
}

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    pub record: PatientRecord,
    pub extracted: ExtractedFields,
    pub adjustments: Vec<String>,
    pub prediction: Prediction,
    pub assessed_at: chrono::DateTime<chrono::Utc>,
}
