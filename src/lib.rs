pub mod api;
pub mod config;
pub mod inference;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

use crate::api::AppContext;
use crate::config::AppConfig;
use crate::inference::{load_model_artifacts, ModelState};

/// Install the global `tracing` subscriber.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load artifacts, then serve the web application until shutdown.
pub async fn run() -> std::io::Result<()> {
    init_tracing();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env();
    let paths = config.artifact_paths();
    tracing::info!(
        classifier = %paths.classifier.display(),
        scaler = %paths.scaler.display(),
        "Loading model artifacts"
    );

    let model = load_model_artifacts(&paths);
    match &model {
        ModelState::Ready(artifacts) => {
            for warning in &artifacts.warnings {
                tracing::warn!("{warning}");
            }
        }
        ModelState::Unavailable { reason } => {
            tracing::error!(reason = %reason, "Prediction disabled");
        }
    }

    api::serve(AppContext::new(model, config)).await
}
