use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingKey(&'static str),
}

/// Runtime configuration, read once at startup from the environment
/// (`.env` is loaded by `main` before this runs).
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub spoonacular_api_key: String,
    /// Absent key disables LLM advice; nutrition replies still work.
    pub openai_api_key: Option<String>,
    /// Absent key disables image queries; text queries still work.
    pub clarifai_api_key: Option<String>,
    pub cache_path: PathBuf,
    pub estimator_timeout: Duration,
    pub min_label_confidence: f32,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            spoonacular_api_key: env::var("SPOONACULAR_API_KEY")
                .map_err(|_| ConfigError::MissingKey("SPOONACULAR_API_KEY"))?,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            clarifai_api_key: env::var("CLARIFAI_API_KEY").ok(),
            cache_path: env::var("NUTRITION_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("nutrition.csv")),
            estimator_timeout: env::var("ESTIMATOR_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or_else(|| Duration::from_secs(10)),
            min_label_confidence: env::var("MIN_LABEL_CONFIDENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.30),
        })
    }
}
