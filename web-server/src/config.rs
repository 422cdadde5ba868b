//! Configuration module

use std::env;
use std::path::PathBuf;

use empleo_core::constants::{DEFAULT_BACKGROUND_LIMIT, DEFAULT_BACKGROUND_SEED, DEFAULT_TOP_FEATURES};
use empleo_core::logic::model::manifest_path_for;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Classifier artifact (ONNX)
    pub model_path: PathBuf,

    /// Classifier manifest, next to the model by default
    pub model_manifest_path: PathBuf,

    /// Expected SHA-256 of the model, overrides the manifest value
    pub model_sha256: Option<String>,

    /// Attribution graph; exact Shapley is used when unset
    pub explainer_path: Option<PathBuf>,

    /// Background rows for Shapley (JSON matrix)
    pub background_path: Option<PathBuf>,
    pub background_limit: usize,
    pub background_seed: u64,

    /// Rows shown in the ranking table
    pub top_features: usize,

    pub session_ttl_minutes: i64,

    /// Environment (development, production)
    pub environment: String,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let model_path = PathBuf::from(
            env::var("MODEL_PATH").unwrap_or_else(|_| "models/random_forest_model.onnx".to_string()),
        );

        let model_manifest_path = non_empty("MODEL_MANIFEST_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| manifest_path_for(&model_path));

        Self {
            port: parsed("PORT", 8080),
            model_manifest_path,
            model_path,
            model_sha256: non_empty("MODEL_SHA256"),
            explainer_path: non_empty("EXPLAINER_PATH").map(PathBuf::from),
            background_path: non_empty("BACKGROUND_PATH").map(PathBuf::from),
            background_limit: parsed("BACKGROUND_LIMIT", DEFAULT_BACKGROUND_LIMIT),
            background_seed: parsed("BACKGROUND_SEED", DEFAULT_BACKGROUND_SEED),
            top_features: parsed("TOP_FEATURES", DEFAULT_TOP_FEATURES),
            session_ttl_minutes: parsed("SESSION_TTL_MINUTES", 120),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        let model_path = PathBuf::from("models/random_forest_model.onnx");
        Self {
            port: 8080,
            model_manifest_path: manifest_path_for(&model_path),
            model_path,
            model_sha256: None,
            explainer_path: None,
            background_path: None,
            background_limit: DEFAULT_BACKGROUND_LIMIT,
            background_seed: DEFAULT_BACKGROUND_SEED,
            top_features: DEFAULT_TOP_FEATURES,
            session_ttl_minutes: 120,
            environment: "development".to_string(),
        }
    }
}
