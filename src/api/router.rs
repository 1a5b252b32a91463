//! Application router.
//!
//! HTML routes at the root, JSON routes nested under `/api/`. Every response
//! carries `Cache-Control: no-store` since pages echo patient data.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::AppContext;

/// Slack for multipart framing on top of the document size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(ctx: AppContext) -> Router {
    let body_limit = ctx.config.max_upload_bytes() as usize + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        .route("/status", get(endpoints::assess::status))
        .route("/extract", post(endpoints::assess::extract))
        .route("/assess", post(endpoints::assess::assess));

    Router::new()
        .route("/", get(endpoints::form::index))
        .route("/upload", post(endpoints::form::upload))
        .route("/predict", post(endpoints::form::predict))
        .route("/health", get(endpoints::health::check))
        .nest("/api", api)
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::inference::classifier::tests::logistic;
    use crate::inference::{ModelArtifacts, ModelState, StandardScaler};
    use crate::pipeline::extraction::pdf::tests::{make_pdf_with_undeclared_font, make_test_pdf};

    fn ready_ctx() -> AppContext {
        let model = ModelState::Ready(ModelArtifacts {
            classifier: logistic(-0.5),
            scaler: StandardScaler::fallback(),
            fallback_scaler: true,
            warnings: vec![],
        });
        AppContext::new(model, AppConfig::from_lookup(|_| None))
    }

    fn unavailable_ctx() -> AppContext {
        AppContext::new(
            ModelState::Unavailable {
                reason: "Artifact not found: models/heart_disease_model.json".into(),
            },
            AppConfig::from_lookup(|_| None),
        )
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn multipart_request(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    // ── Pages ───────────────────────────────────────────────────

    #[tokio::test]
    async fn health_returns_ok() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["cache-control"], "no-store");
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn index_renders_form() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Model and scaler loaded successfully"));
        assert!(html.contains(r#"action="/predict""#));
    }

    #[tokio::test]
    async fn index_shows_unavailable_banner() {
        let app = build_router(unavailable_ctx());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_string(response).await;
        assert!(html.contains("Error loading model or scaler"));
    }

    #[tokio::test]
    async fn upload_text_report_seeds_form() {
        let app = build_router(ready_ctx());
        let report = b"Age: 52\nBMI: 27.3\nSmoker: yes\nGender: male";
        let response = app
            .oneshot(multipart_request("report.txt", "text/plain", report))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("File uploaded: report.txt"));
        assert!(html.contains("<li>age: 52</li>"));
        assert!(html.contains(r#"name="age" min="1" max="120" step="1" value="52""#));
        assert!(html.contains(r#"<option value="yes" selected>Yes</option>"#));
    }

    #[tokio::test]
    async fn upload_pdf_report_extracts_fields() {
        let app = build_router(ready_ctx());
        let pdf = make_test_pdf(&["Age: 61", "Glucose: 140"]);
        let response = app
            .oneshot(multipart_request("report.pdf", "application/pdf", &pdf))
            .await
            .unwrap();
        let html = body_string(response).await;
        assert!(html.contains("<li>age: 61</li>"));
        assert!(html.contains("<li>glucose: 140</li>"));
    }

    #[tokio::test]
    async fn upload_without_patterns_warns() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(multipart_request("notes.txt", "text/plain", b"Nothing useful here."))
            .await
            .unwrap();
        let html = body_string(response).await;
        assert!(html.contains("No medical data patterns found in the file."));
    }

    #[tokio::test]
    async fn upload_unreadable_file_reports_error() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(multipart_request("scan.txt", "text/plain", &[0xff, 0xfe, 0x00, 0x80]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Error reading scan.txt"));
        assert!(html.contains(r#"name="extracted" value="{}""#));
    }

    #[tokio::test]
    async fn upload_pdf_that_panics_parser_keeps_server_up() {
        let app = build_router(ready_ctx());
        let pdf = make_pdf_with_undeclared_font("Age 40");
        let response = app
            .clone()
            .oneshot(multipart_request("broken.pdf", "application/pdf", &pdf))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Error reading broken.pdf"));
        assert!(html.contains(r#"name="extracted" value="{}""#));

        let health = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn predict_renders_summary_and_result() {
        let app = build_router(ready_ctx());
        let body = "name=Ada+%3Cb%3E&extracted=%7B%22age%22%3A52.0%7D&male=female&sysBP=400&glucose=";
        let response = app.oneshot(form_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Patient Data Summary"));
        assert!(html.contains("<tr><td>Name</td><td>Ada &lt;b&gt;</td></tr>"));
        assert!(html.contains("<tr><td>Gender</td><td>Female</td></tr>"));
        assert!(html.contains("<tr><td>Age</td><td>52</td></tr>"));
        assert!(html.contains("<tr><td>Systolic BP</td><td>250</td></tr>"));
        assert!(html.contains("<tr><td>Glucose</td><td>100</td></tr>"));
        assert!(html.contains("Systolic BP 400 outside 70–250, using 250"));
        assert!(html.contains("Risk Probability"));
        assert!(html.contains("%</strong>"));
        assert!(html.contains("Disclaimer"));
    }

    #[tokio::test]
    async fn predict_rejects_invalid_number() {
        let app = build_router(ready_ctx());
        let response = app.oneshot(form_request("age=abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(response).await;
        assert!(html.contains("Invalid number for age"));
        assert!(!html.contains("Patient Data Summary"));
    }

    #[tokio::test]
    async fn predict_without_model_shows_error() {
        let app = build_router(unavailable_ctx());
        let response = app.oneshot(form_request("age=40")).await.unwrap();
        let html = body_string(response).await;
        assert!(html.contains("Patient Data Summary"));
        assert!(html.contains("Model or scaler not loaded. Prediction unavailable."));
        assert!(!html.contains("Risk Probability"));
    }

    // ── JSON API ────────────────────────────────────────────────

    #[tokio::test]
    async fn api_status_reports_state() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["fallback_scaler"], true);
    }

    #[tokio::test]
    async fn api_extract_returns_fields() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(
                Request::post("/api/extract")
                    .header("content-type", "text/plain")
                    .body(Body::from("Age: 52\nBMI: 27.3\nSmoker: yes\nGender: male"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["found"], 4);
        assert_eq!(json["fields"]["age"], 52.0);
        assert_eq!(json["fields"]["BMI"], 27.3);
        assert_eq!(json["fields"]["currentSmoker"], 1.0);
        assert_eq!(json["fields"]["male"], 1.0);
    }

    #[tokio::test]
    async fn api_extract_rejects_empty_body() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(Request::post("/api/extract").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_assess_end_to_end() {
        let app = build_router(ready_ctx());
        let request = serde_json::json!({
            "text": "Age: 52\nBMI: 27.3\nSmoker: yes\nGender: male",
            "overrides": { "BMI": 75, "diabetes": "yes" }
        });
        let response = app
            .oneshot(
                Request::post("/api/assess")
                    .header("content-type", "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["record"]["age"], 52);
        assert_eq!(json["record"]["BMI"], 60.0);
        assert_eq!(json["record"]["diabetes"], 1);
        assert_eq!(json["record"]["glucose"], 100.0);
        assert_eq!(json["adjustments"][0], "BMI 75 outside 10–60, using 60");
        let label = json["prediction"]["label"].as_str().unwrap();
        assert!(label == "low" || label == "high");
        let p = json["prediction"]["probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        assert!(json["assessed_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn api_assess_unavailable_model_is_503() {
        let app = build_router(unavailable_ctx());
        let response = app
            .oneshot(
                Request::post("/api/assess")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"]["code"], "MODEL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn api_assess_invalid_choice_is_422() {
        let app = build_router(ready_ctx());
        let response = app
            .oneshot(
                Request::post("/api/assess")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"overrides":{"diabetes":"sometimes"}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
