//! ONNX Runtime backend
//!
//! Loads the exported classifier (e.g. a random forest converted with
//! skl2onnx, `zipmap=False`) and serves batched `predict_proba` calls.

use std::path::Path;

use ndarray::{Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::error::CoreResult;

use super::artifact::read_artifact;
use super::classifier::{Classifier, ModelManifest, ModelMetadata};
use super::inference::InferenceError;

/// Build an optimized session from model bytes
pub(crate) fn build_session(model_bytes: &[u8]) -> Result<Session, InferenceError> {
    Session::builder()
        .map_err(|e| InferenceError(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| InferenceError(format!("Failed to set optimization: {}", e)))?
        .commit_from_memory(model_bytes)
        .map_err(|e| InferenceError(format!("Failed to load model: {}", e)))
}

/// Fail unless `wanted` is one of the graph's `kind` ports
pub(crate) fn require_port(kind: &str, wanted: &str, available: &[&str]) -> Result<(), InferenceError> {
    if available.contains(&wanted) {
        return Ok(());
    }
    Err(InferenceError(format!(
        "Model has no {} '{}' (available: {:?})",
        kind, wanted, available
    )))
}

/// Check that the session exposes the configured input and output names
pub(crate) fn check_ports(session: &Session, input_name: &str, output_name: &str) -> Result<(), InferenceError> {
    let inputs: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
    require_port("input", input_name, &inputs)?;

    let outputs: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
    require_port("output", output_name, &outputs)
}

/// Run one f32 batch bound to `input_name` and return the named output as
/// `(shape, data)`
pub(crate) fn run_session(
    session: &Mutex<Session>,
    batch: ArrayView2<'_, f32>,
    input_name: &str,
    output_name: &str,
) -> Result<(Vec<usize>, Vec<f32>), InferenceError> {
    let input_tensor = Value::from_array(batch.to_owned())
        .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

    // Session::run needs exclusive access
    let mut session = session.lock();
    let outputs = session
        .run(ort::inputs![input_name => input_tensor])
        .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

    let output = outputs
        .get(output_name)
        .ok_or_else(|| InferenceError(format!("No output named '{}'", output_name)))?;

    let (shape, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;

    let shape = shape
        .iter()
        .map(|&d| usize::try_from(d).map_err(|_| InferenceError(format!("Dynamic output dimension {}", d))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((shape, data.to_vec()))
}

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    session: Mutex<Session>,
    metadata: ModelMetadata,
    input_name: String,
    probability_output: String,
}

impl OnnxClassifier {
    /// Load the model named by `model_path`, verifying the checksum from
    /// `expected_sha256` (or the manifest's `sha256`) when present
    pub fn load(model_path: &Path, manifest: &ModelManifest, expected_sha256: Option<&str>) -> CoreResult<Self> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        manifest.validate_layout()?;

        let checksum = expected_sha256.or(manifest.sha256.as_deref());
        let bytes = read_artifact(model_path, checksum)?;

        let classifier = Self::from_bytes(&bytes, manifest, model_path.display().to_string())?;
        log::info!(
            "ONNX model '{}' loaded ({} features, positive class {})",
            manifest.name,
            manifest.input_width(),
            manifest.positive_class
        );
        Ok(classifier)
    }

    /// Load from bytes already in memory
    pub fn from_bytes(model_bytes: &[u8], manifest: &ModelManifest, source: impl Into<String>) -> Result<Self, InferenceError> {
        let session = build_session(model_bytes)?;

        check_ports(&session, &manifest.input_name, &manifest.probability_output)?;

        Ok(Self {
            session: Mutex::new(session),
            metadata: manifest.metadata(source),
            input_name: manifest.input_name.clone(),
            probability_output: manifest.probability_output.clone(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict_proba(&self, batch: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError> {
        let rows = batch.nrows();
        let (shape, data) = run_session(&self.session, batch, &self.input_name, &self.probability_output)?;

        let classes = self.metadata.class_count;
        if shape != [rows, classes] {
            return Err(InferenceError(format!(
                "Expected probability tensor [{}, {}], got {:?}",
                rows, classes, shape
            )));
        }

        Array2::from_shape_vec((rows, classes), data)
            .map_err(|e| InferenceError(format!("Array error: {}", e)))
    }
}
