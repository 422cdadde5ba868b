//! Model Module - Classifier loading and inference
//!
//! The classifier is an external artifact; this module only negotiates its
//! input contract (order, width) and reads the positive-class probability.

pub mod artifact;
pub mod classifier;
pub mod inference;
pub mod onnx;

// Re-export common types
pub use artifact::{manifest_path_for, read_artifact, sha256_hex, ArtifactError};
pub use classifier::{Classifier, ModelManifest, ModelMetadata};
pub use inference::{format_probability, Comparison, EngineStatus, InferenceError, Prediction, Predictor};
pub use onnx::OnnxClassifier;
