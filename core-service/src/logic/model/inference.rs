//! Inference Engine - Prediction Service
//!
//! Runs one encoded individual through the shared classifier and returns the
//! probability of the positive ("employed") class.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::logic::features::FeatureVector;

use super::classifier::{Classifier, ModelMetadata};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
#[error("InferenceError: {0}")]
pub struct InferenceError(pub String);

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Positive-class probability, 0.0 - 1.0
    pub probability: f32,
    pub positive_class: usize,
    /// Microseconds
    pub inference_time_us: u64,
}

impl Prediction {
    /// Two-decimal percentage, e.g. `62.00%`
    pub fn percent_text(&self) -> String {
        format_probability(self.probability)
    }
}

/// Format a probability as a two-decimal percentage
pub fn format_probability(probability: f32) -> String {
    format!("{:.2}%", f64::from(probability) * 100.0)
}

/// Original vs. counterfactual prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub original: Prediction,
    pub counterfactual: Prediction,
    /// Percentage points, counterfactual minus original
    pub delta_points: f32,
}

/// Engine Status for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub input_width: usize,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// Prediction service over an injected, read-only classifier
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn metadata(&self) -> &ModelMetadata {
        self.classifier.metadata()
    }

    /// Fails with `ConfigurationDrift` when the encoder and model disagree on width
    pub fn check_width(&self, actual: usize) -> CoreResult<()> {
        let expected = self.classifier.input_width();
        if actual != expected {
            log::warn!(
                "Configuration drift: {} features encoded, model '{}' expects {}",
                actual,
                self.metadata().name,
                expected
            );
            return Err(CoreError::ConfigurationDrift { expected, actual });
        }
        Ok(())
    }

    pub fn predict(&self, features: &FeatureVector) -> CoreResult<Prediction> {
        features.validate()?;
        self.predict_values(features.as_slice())
    }

    /// Predict from a raw slice. The slice is never padded or truncated.
    pub fn predict_values(&self, values: &[f32]) -> CoreResult<Prediction> {
        self.check_width(values.len())?;

        let start_time = std::time::Instant::now();
        let metadata = self.metadata();

        let batch = ArrayView2::from_shape((1, values.len()), values)
            .map_err(|e| InferenceError(format!("Array error: {}", e)))?;
        let probabilities = self.classifier.predict_proba(batch)?;

        if probabilities.nrows() != 1 || probabilities.ncols() != metadata.class_count {
            return Err(InferenceError(format!(
                "Expected probabilities of shape (1, {}), got {:?}",
                metadata.class_count,
                probabilities.shape()
            ))
            .into());
        }

        let probability = probabilities[[0, metadata.positive_class]];
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError(format!("Probability out of range: {}", probability)).into());
        }

        let inference_time_us = start_time.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Prediction {:.4} from '{}' in {}us",
            probability,
            metadata.name,
            inference_time_us
        );

        Ok(Prediction {
            probability,
            positive_class: metadata.positive_class,
            inference_time_us,
        })
    }

    /// Predict both vectors; neither is modified
    pub fn compare(&self, original: &FeatureVector, counterfactual: &FeatureVector) -> CoreResult<Comparison> {
        let original = self.predict(original)?;
        let counterfactual = self.predict(counterfactual)?;

        Ok(Comparison {
            delta_points: (counterfactual.probability - original.probability) * 100.0,
            original,
            counterfactual,
        })
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_name: self.metadata().name.clone(),
            input_width: self.classifier.input_width(),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
