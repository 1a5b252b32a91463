//! JSON API: model status, text extraction, full assessment.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AppContext, AssessRequest, AssessResponse, ExtractResponse};
use crate::inference::{predict, ModelStatus};
use crate::pipeline::extraction::{extract_medical_fields, ExtractedFields};
use crate::pipeline::normalize::normalize;

/// `GET /api/status`
pub async fn status(State(ctx): State<AppContext>) -> Json<ModelStatus> {
    Json(ctx.model.status())
}

/// `POST /api/extract`: plain-text report body.
pub async fn extract(body: String) -> Result<Json<ExtractResponse>, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("Empty report text".into()));
    }
    let fields = extract_medical_fields(&body);
    Ok(Json(ExtractResponse {
        found: fields.len(),
        fields,
    }))
}

/// `POST /api/assess`: extract (optional), normalize, predict.
pub async fn assess(
    State(ctx): State<AppContext>,
    Json(request): Json<AssessRequest>,
) -> Result<Json<AssessResponse>, ApiError> {
    let extracted = request
        .text
        .as_deref()
        .map(extract_medical_fields)
        .unwrap_or_else(ExtractedFields::new);

    let normalized = normalize(&extracted, &request.overrides)?;
    let prediction = predict(&ctx.model, &normalized.record)?;

    Ok(Json(AssessResponse {
        record: normalized.record,
        extracted,
        adjustments: normalized.adjustments.iter().map(ToString::to_string).collect(),
        prediction,
        assessed_at: chrono::Utc::now(),
    }))
}
