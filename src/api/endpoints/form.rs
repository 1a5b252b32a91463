//! HTML form flow: `GET /`, `POST /upload`, `POST /predict`.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;

use crate::api::pages::{render_page, Outcome, PageView, UploadNotice};
use crate::api::types::AppContext;
use crate::inference::predict as run_prediction;
use crate::pipeline::extraction::{extract_medical_fields, DocumentError, ExtractedFields};
use crate::pipeline::normalize::{normalize, seed_defaults, Overrides};

/// `GET /`: empty form with baseline values.
pub async fn index(State(ctx): State<AppContext>) -> Html<String> {
    Html(render_page(&PageView::new(ctx.model.status())))
}

/// `POST /upload`: read the uploaded report and re-render the form seeded
/// with whatever fields were found.
pub async fn upload(State(ctx): State<AppContext>, mut multipart: Multipart) -> Response {
    let mut view = PageView::new(ctx.model.status());

    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = field.file_name().unwrap_or("document").to_string();
                let content_type = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, content_type, bytes.to_vec())),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read upload bytes");
                        view.upload = Some(UploadNotice::Failed {
                            message: format!("Failed to read file data: {}", e.body_text()),
                        });
                        return (e.status(), Html(render_page(&view))).into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed multipart upload");
                view.upload = Some(UploadNotice::Failed {
                    message: format!("Invalid upload: {}", e.body_text()),
                });
                return (e.status(), Html(render_page(&view))).into_response();
            }
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        view.upload = Some(UploadNotice::Failed {
            message: "No file provided.".into(),
        });
        return (StatusCode::BAD_REQUEST, Html(render_page(&view))).into_response();
    };

    let reader = ctx.reader.clone();
    let name_for_read = filename.clone();
    let read = tokio::task::spawn_blocking(move || {
        reader.read(&bytes, content_type.as_deref(), Some(name_for_read.as_str()))
    })
    .await
    .unwrap_or_else(|e| Err(DocumentError::PdfParsing(format!("reader task failed: {e}"))));

    match read {
        Ok(document) => {
            let extracted = extract_medical_fields(&document.full_text);
            view.form = seed_defaults(&extracted).record;
            view.upload = Some(if extracted.is_empty() {
                UploadNotice::NoPatterns { filename }
            } else {
                UploadNotice::Extracted { filename }
            });
            view.extracted = extracted;
        }
        Err(e) => {
            tracing::warn!(filename = %filename, error = %e, "Document read failed");
            view.upload = Some(UploadNotice::Failed {
                message: format!("Error reading {filename}: {e}"),
            });
        }
    }

    Html(render_page(&view)).into_response()
}

/// `POST /predict`: normalize the submitted form and run the model.
pub async fn predict(
    State(ctx): State<AppContext>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let mut view = PageView::new(ctx.model.status());

    let lookup = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    view.name = lookup("name").unwrap_or_default().to_string();
    view.extracted = match lookup("extracted").filter(|s| !s.trim().is_empty()) {
        Some(raw) => serde_json::from_str::<ExtractedFields>(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring malformed extracted payload");
            ExtractedFields::new()
        }),
        None => ExtractedFields::new(),
    };

    let overrides = Overrides::from_form(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let normalized = match normalize(&view.extracted, &overrides) {
        Ok(n) => n,
        Err(e) => {
            view.form = seed_defaults(&view.extracted).record;
            view.outcome = Some(Outcome::Rejected {
                message: e.to_string(),
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(render_page(&view))).into_response();
        }
    };

    view.form = normalized.record.clone();
    view.outcome = Some(match run_prediction(&ctx.model, &normalized.record) {
        Ok(prediction) => Outcome::Assessed {
            record: normalized.record,
            adjustments: normalized.adjustments,
            prediction,
        },
        Err(e) => Outcome::NotPredicted {
            record: normalized.record,
            message: e.to_string(),
        },
    });

    Html(render_page(&view)).into_response()
}
