//! Attribution Engine - adapter over an external explainer
//!
//! Sources report attributions in whatever layout their library uses. The
//! engine checks the result against the layout the source declared and picks
//! the positive class explicitly; a wrong class index or axis would flip the
//! meaning of every reported influence without any visible error.

use std::sync::Arc;

use ndarray::{s, ArrayView2};

use crate::error::{CoreError, CoreResult};
use crate::logic::features::FeatureVector;
use crate::logic::model::InferenceError;

use super::types::{Attribution, AttributionError, AttributionOutput, OutputLayout, RawAttribution};

/// An attribution method built once against the classifier
pub trait AttributionSource: Send + Sync {
    fn name(&self) -> &str;

    /// The layout every result of `explain` is returned in
    fn layout(&self) -> OutputLayout;

    /// Attributions for a `(samples, features)` batch
    fn explain(&self, batch: ArrayView2<'_, f32>) -> Result<RawAttribution, AttributionError>;
}

pub struct AttributionEngine {
    source: Arc<dyn AttributionSource>,
    positive_class: usize,
    width: usize,
}

impl AttributionEngine {
    pub fn new(source: Arc<dyn AttributionSource>, positive_class: usize, width: usize) -> Self {
        Self {
            source,
            positive_class,
            width,
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn layout(&self) -> OutputLayout {
        self.source.layout()
    }

    /// Positive-class attribution for one encoded individual
    pub fn explain(&self, features: &FeatureVector) -> CoreResult<Attribution> {
        if features.len() != self.width {
            return Err(CoreError::ConfigurationDrift {
                expected: self.width,
                actual: features.len(),
            });
        }

        let batch = ArrayView2::from_shape((1, features.len()), features.as_slice())
            .map_err(|e| InferenceError(format!("Array error: {}", e)))?;
        let raw = self.source.explain(batch)?;
        let attribution = self.normalize(raw)?;

        log::debug!(
            "Attribution from '{}': expected {:.4}, total |phi| {:.4}",
            self.source.name(),
            attribution.expected_value,
            attribution.total_magnitude()
        );
        Ok(attribution)
    }

    /// Reduce a raw single-sample result to one ordered score per feature
    pub fn normalize(&self, raw: RawAttribution) -> Result<Attribution, AttributionError> {
        let declared = self.source.layout();
        let actual = raw.output.layout();
        if declared != actual {
            return Err(AttributionError::LayoutMismatch { declared, actual });
        }

        let unrecognized = || AttributionError::UnrecognizedShape {
            layout: actual,
            shape: raw.output.shape(),
        };

        let (values, classes) = match &raw.output {
            AttributionOutput::PerClass(list) => {
                if list.len() <= self.positive_class
                    || list.iter().any(|m| m.shape() != [1, self.width])
                {
                    return Err(unrecognized());
                }
                (list[self.positive_class].row(0).to_vec(), list.len())
            }
            AttributionOutput::ClassAxis(array) => {
                let shape = array.shape();
                if shape.len() != 3 || shape[0] != 1 || shape[1] != self.width || shape[2] <= self.positive_class {
                    return Err(unrecognized());
                }
                (array.slice(s![0, .., self.positive_class]).to_vec(), shape[2])
            }
            AttributionOutput::SingleOutput(matrix) => {
                if matrix.shape() != [1, self.width] {
                    return Err(unrecognized());
                }
                (matrix.row(0).to_vec(), 1)
            }
        };

        if raw.expected_value.len() != classes {
            return Err(AttributionError::ExpectedValueShape {
                layout: actual,
                needed: classes,
                got: raw.expected_value.len(),
            });
        }
        let expected_value = if classes == 1 {
            raw.expected_value[0]
        } else {
            raw.expected_value[self.positive_class]
        };

        if let Some(feature) = values.iter().position(|v| !v.is_finite()) {
            return Err(AttributionError::NonFinite { feature });
        }

        Ok(Attribution { values, expected_value })
    }
}
