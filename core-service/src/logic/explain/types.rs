//! Attribution output layouts, results and errors

use std::fmt;

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::logic::model::InferenceError;

/// Output layout an attribution source declares for its raw result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// One `(samples, features)` matrix per class
    PerClass,
    /// A single `(samples, features, classes)` array
    ClassAxis,
    /// A single `(samples, features)` matrix for the one explained output
    SingleOutput,
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputLayout::PerClass => "per_class",
            OutputLayout::ClassAxis => "class_axis",
            OutputLayout::SingleOutput => "single_output",
        })
    }
}

/// Raw attribution arrays as produced by a source
#[derive(Debug, Clone)]
pub enum AttributionOutput {
    PerClass(Vec<Array2<f32>>),
    ClassAxis(Array3<f32>),
    SingleOutput(Array2<f32>),
}

impl AttributionOutput {
    pub fn layout(&self) -> OutputLayout {
        match self {
            AttributionOutput::PerClass(_) => OutputLayout::PerClass,
            AttributionOutput::ClassAxis(_) => OutputLayout::ClassAxis,
            AttributionOutput::SingleOutput(_) => OutputLayout::SingleOutput,
        }
    }

    /// Shape for error reporting; per-class lists report `[classes, ..first]`
    pub fn shape(&self) -> Vec<usize> {
        match self {
            AttributionOutput::PerClass(list) => {
                let mut shape = vec![list.len()];
                if let Some(first) = list.first() {
                    shape.extend_from_slice(first.shape());
                }
                shape
            }
            AttributionOutput::ClassAxis(array) => array.shape().to_vec(),
            AttributionOutput::SingleOutput(array) => array.shape().to_vec(),
        }
    }
}

/// Source result: attribution arrays plus the baseline expected value(s)
#[derive(Debug, Clone)]
pub struct RawAttribution {
    pub output: AttributionOutput,
    /// One value per class, or a single value for `SingleOutput`
    pub expected_value: Vec<f32>,
}

/// Normalized attribution for the positive class of one individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Signed score per feature, layout order
    pub values: Vec<f32>,
    /// Baseline prediction the scores are measured from
    pub expected_value: f32,
}

impl Attribution {
    pub fn total_magnitude(&self) -> f32 {
        self.values.iter().map(|v| v.abs()).sum()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AttributionError {
    #[error("explainer declared layout {declared} but returned {actual}")]
    LayoutMismatch { declared: OutputLayout, actual: OutputLayout },

    #[error("unrecognized attribution shape {shape:?} for layout {layout}")]
    UnrecognizedShape { layout: OutputLayout, shape: Vec<usize> },

    #[error("expected value has {got} entries, layout {layout} needs {needed}")]
    ExpectedValueShape { layout: OutputLayout, needed: usize, got: usize },

    #[error("non-finite attribution for feature {feature}")]
    NonFinite { feature: usize },

    #[error("background data: {0}")]
    Background(String),

    #[error("exact Shapley supports at most {max} features, model has {features}")]
    TooManyFeatures { features: usize, max: usize },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
