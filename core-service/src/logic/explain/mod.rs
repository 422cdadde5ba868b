//! Explain Module - per-feature attribution of a prediction

pub mod types;
pub mod engine;
pub mod shapley;
pub mod onnx;

pub use types::{Attribution, AttributionError, AttributionOutput, OutputLayout, RawAttribution};
pub use engine::{AttributionEngine, AttributionSource};
pub use shapley::{load_background, reference_background, ShapleyExplainer};
pub use onnx::{ExplainerManifest, OnnxExplainer};
