//! Liveness check.

/// `GET /health`
pub async fn check() -> &'static str {
    "ok"
}
