//! Classifier capability and model manifest

use std::path::Path;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLASS_COUNT, DEFAULT_INPUT_NAME, DEFAULT_POSITIVE_CLASS, DEFAULT_PROBABILITY_OUTPUT,
};
use crate::error::CoreResult;
use crate::logic::features::layout::{validate_feature_names, FEATURE_VERSION};

use super::artifact::{read_json, ArtifactError};
use super::inference::InferenceError;

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A loaded probabilistic classifier
///
/// Implementations are immutable after construction and shared across
/// requests behind an `Arc`.
pub trait Classifier: Send + Sync {
    fn metadata(&self) -> &ModelMetadata;

    /// Class probabilities for a batch of rows: `(rows, features)` → `(rows, classes)`
    fn predict_proba(&self, batch: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError>;

    fn input_width(&self) -> usize {
        self.metadata().input_width
    }
}

/// Runtime description of a loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub source: String,
    pub input_width: usize,
    pub class_count: usize,
    pub positive_class: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, input_width: usize) -> Self {
        Self {
            name: name.into(),
            source: "<memory>".to_string(),
            input_width,
            class_count: DEFAULT_CLASS_COUNT,
            positive_class: DEFAULT_POSITIVE_CLASS,
            loaded_at: chrono::Utc::now(),
        }
    }
}

// ============================================================================
// MANIFEST
// ============================================================================

fn default_layout_version() -> u8 {
    FEATURE_VERSION
}

fn default_class_count() -> usize {
    DEFAULT_CLASS_COUNT
}

fn default_positive_class() -> usize {
    DEFAULT_POSITIVE_CLASS
}

fn default_input_name() -> String {
    DEFAULT_INPUT_NAME.to_string()
}

fn default_probability_output() -> String {
    DEFAULT_PROBABILITY_OUTPUT.to_string()
}

/// JSON sidecar shipped with the model artifact
///
/// ```json
/// {
///   "name": "random_forest_model",
///   "feature_names": ["jefehogar", "hombre", "rural", "ESCOACUM", "EDAD",
///                     "EDAD2", "HLENGUA", "hombrecasado", "casado", "Ident_Indigena"],
///   "positive_class": 1
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    #[serde(default = "default_layout_version")]
    pub layout_version: u8,
    pub feature_names: Vec<String>,
    #[serde(default = "default_class_count")]
    pub class_count: usize,
    #[serde(default = "default_positive_class")]
    pub positive_class: usize,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_probability_output")]
    pub probability_output: String,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl ModelManifest {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let manifest: ModelManifest = read_json(path)?;
        if manifest.positive_class >= manifest.class_count {
            return Err(ArtifactError::InvalidManifest {
                path: path.to_path_buf(),
                reason: format!(
                    "positive_class {} out of range for {} classes",
                    manifest.positive_class, manifest.class_count
                ),
            });
        }
        Ok(manifest)
    }

    /// The model must have been trained on the current feature layout
    pub fn validate_layout(&self) -> CoreResult<()> {
        validate_feature_names(self.layout_version, self.feature_names.as_slice())?;
        Ok(())
    }

    pub fn input_width(&self) -> usize {
        self.feature_names.len()
    }

    pub fn metadata(&self, source: impl Into<String>) -> ModelMetadata {
        ModelMetadata {
            name: self.name.clone(),
            source: source.into(),
            input_width: self.input_width(),
            class_count: self.class_count,
            positive_class: self.positive_class,
            loaded_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::logic::features::FEATURE_LAYOUT;

    fn write_manifest(json: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, json).unwrap();
        (dir, path)
    }

    #[test]
    fn test_manifest_defaults_and_layout() {
        let names = serde_json::to_string(FEATURE_LAYOUT).unwrap();
        let (_dir, path) = write_manifest(&format!(r#"{{"name": "rf", "feature_names": {}}}"#, names));

        let manifest = ModelManifest::load(&path).unwrap();
        assert_eq!(manifest.positive_class, 1);
        assert_eq!(manifest.class_count, 2);
        assert_eq!(manifest.input_name, "float_input");
        assert_eq!(manifest.input_width(), 10);
        assert!(manifest.validate_layout().is_ok());
    }

    #[test]
    fn test_manifest_reordered_features_rejected() {
        let mut names: Vec<&str> = FEATURE_LAYOUT.to_vec();
        names.swap(0, 1);
        let (_dir, path) = write_manifest(&format!(
            r#"{{"name": "rf", "feature_names": {}}}"#,
            serde_json::to_string(&names).unwrap()
        ));

        let manifest = ModelManifest::load(&path).unwrap();
        assert!(matches!(manifest.validate_layout(), Err(CoreError::Layout(_))));
    }

    #[test]
    fn test_manifest_positive_class_out_of_range() {
        let (_dir, path) = write_manifest(r#"{"name": "rf", "feature_names": [], "positive_class": 2}"#);
        assert!(matches!(
            ModelManifest::load(&path),
            Err(ArtifactError::InvalidManifest { .. })
        ));
    }
}
