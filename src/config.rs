use std::net::SocketAddr;
use std::path::PathBuf;

use crate::inference::ArtifactPaths;

/// Application-level constants
pub const APP_NAME: &str = "CardioRisk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_CLASSIFIER_FILE: &str = "heart_disease_model.json";
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 20;

/// Log filter used when `RUST_LOG` is unset or invalid.
pub fn default_log_filter() -> &'static str {
    "info,cardiorisk_lib=debug,tower_http=info"
}

/// Per-user application directory: ~/CardioRisk/
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// `./models` when present, otherwise ~/CardioRisk/models.
pub fn default_model_dir() -> PathBuf {
    let local = PathBuf::from("models");
    if local.is_dir() {
        return local;
    }
    app_data_dir()
        .map(|dir| dir.join("models"))
        .unwrap_or(local)
}

/// Runtime configuration resolved from `CARDIORISK_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub model_dir: PathBuf,
    pub classifier_file: String,
    pub scaler_file: String,
    pub max_upload_mb: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            model_dir: default_model_dir(),
            classifier_file: DEFAULT_CLASSIFIER_FILE.to_string(),
            scaler_file: DEFAULT_SCALER_FILE.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup. Invalid values keep the default
    /// and log a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(raw) = get("CARDIORISK_BIND") {
            match raw.parse() {
                Ok(addr) => config.bind = addr,
                Err(e) => tracing::warn!(value = %raw, error = %e, "Invalid CARDIORISK_BIND, using {DEFAULT_BIND}"),
            }
        }
        if let Some(raw) = get("CARDIORISK_MODEL_DIR") {
            config.model_dir = PathBuf::from(raw);
        }
        if let Some(raw) = get("CARDIORISK_CLASSIFIER_FILE") {
            config.classifier_file = raw;
        }
        if let Some(raw) = get("CARDIORISK_SCALER_FILE") {
            config.scaler_file = raw;
        }
        if let Some(raw) = get("CARDIORISK_MAX_UPLOAD_MB") {
            match raw.parse::<u64>() {
                Ok(mb) if mb > 0 => config.max_upload_mb = mb,
                _ => tracing::warn!(
                    value = %raw,
                    "Invalid CARDIORISK_MAX_UPLOAD_MB, using {DEFAULT_MAX_UPLOAD_MB}"
                ),
            }
        }
        config
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.model_dir, &self.classifier_file, &self.scaler_file)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.classifier_file, "heart_disease_model.json");
        assert_eq!(config.scaler_file, "scaler.json");
        assert_eq!(config.max_upload_mb, 20);
        assert_eq!(config.max_upload_bytes(), 20 * 1024 * 1024);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CARDIORISK_BIND", "0.0.0.0:9000"),
            ("CARDIORISK_MODEL_DIR", "/srv/models"),
            ("CARDIORISK_CLASSIFIER_FILE", "svc.json"),
            ("CARDIORISK_SCALER_FILE", "std.json"),
            ("CARDIORISK_MAX_UPLOAD_MB", "5"),
        ]));
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.max_upload_mb, 5);
        let paths = config.artifact_paths();
        assert_eq!(paths.classifier, PathBuf::from("/srv/models/svc.json"));
        assert_eq!(paths.scaler, PathBuf::from("/srv/models/std.json"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CARDIORISK_BIND", "not-an-address"),
            ("CARDIORISK_MAX_UPLOAD_MB", "0"),
            ("CARDIORISK_CLASSIFIER_FILE", "   "),
        ]));
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.max_upload_mb, DEFAULT_MAX_UPLOAD_MB);
        assert_eq!(config.classifier_file, DEFAULT_CLASSIFIER_FILE);
    }

    #[test]
    fn app_data_dir_under_home() {
        if let (Some(dir), Some(home)) = (app_data_dir(), dirs::home_dir()) {
            assert!(dir.starts_with(home));
            assert!(dir.ends_with("CardioRisk"));
        }
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
