//! Runtime settings read from the environment (and an optional `.env` file).

use std::path::PathBuf;

pub const APP_NAME: &str = "advisor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MODELS_DIR_ENV: &str = "ADVISOR_MODELS_DIR";
pub const LOG_ENV: &str = "ADVISOR_LOG";

pub const DEFAULT_MODELS_DIR: &str = "./models";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding the model artifacts.
    pub models_dir: PathBuf,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            models_dir: non_empty(MODELS_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            log_filter: non_empty(LOG_ENV).unwrap_or(defaults.log_filter),
        }
    }
}
