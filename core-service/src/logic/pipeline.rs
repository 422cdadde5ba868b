//! Evaluation Pipeline
//!
//! encode → predict → explain → rank for one submitted form. The classifier
//! and attribution source are built once by the caller and shared read-only.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::logic::explain::{Attribution, AttributionEngine, AttributionSource};
use crate::logic::features::{encode, BinaryField, FeatureVector, LayoutInfo, RawResponse, FEATURE_COUNT};
use crate::logic::model::{Classifier, Comparison, Predictor};
use crate::logic::report::{rank, Report, ReportOptions};

/// Everything produced for one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub response: RawResponse,
    pub features: FeatureVector,
    pub prediction: crate::logic::model::Prediction,
    pub attribution: Attribution,
    pub report: Report,
}

/// Prediction before and after flipping one binary answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterfactual {
    pub field: BinaryField,
    pub original: RawResponse,
    pub flipped: RawResponse,
    pub original_text: String,
    pub flipped_text: String,
    pub comparison: Comparison,
}

pub struct Pipeline {
    predictor: Predictor,
    explainer: AttributionEngine,
    options: ReportOptions,
}

impl Pipeline {
    /// Fails with `ConfigurationDrift` if the classifier width differs from the encoder's
    pub fn new(classifier: Arc<dyn Classifier>, source: Arc<dyn AttributionSource>, options: ReportOptions) -> CoreResult<Self> {
        let width = classifier.input_width();
        if width != FEATURE_COUNT {
            log::warn!(
                "Model '{}' expects {} inputs, encoder produces {}",
                classifier.metadata().name,
                width,
                FEATURE_COUNT
            );
            return Err(CoreError::ConfigurationDrift {
                expected: width,
                actual: FEATURE_COUNT,
            });
        }

        let positive_class = classifier.metadata().positive_class;
        log::info!(
            "Pipeline ready: model '{}', explainer '{}' ({}), top {}",
            classifier.metadata().name,
            source.name(),
            source.layout(),
            options.top_n
        );

        Ok(Self {
            explainer: AttributionEngine::new(source, positive_class, width),
            predictor: Predictor::new(classifier),
            options,
        })
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn explainer(&self) -> &AttributionEngine {
        &self.explainer
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn layout_info(&self) -> LayoutInfo {
        LayoutInfo::current()
    }

    pub fn evaluate(&self, response: &RawResponse) -> CoreResult<Evaluation> {
        self.evaluate_with(response, &self.options)
    }

    /// Same as `evaluate` with per-request report options
    pub fn evaluate_with(&self, response: &RawResponse, options: &ReportOptions) -> CoreResult<Evaluation> {
        let features = encode(response);
        log::debug!("Encoded features: {}", features.to_log_entry());

        let prediction = self.predictor.predict(&features)?;
        let attribution = self.explainer.explain(&features)?;
        let report = rank(&features, &prediction, &attribution, options)?;

        Ok(Evaluation {
            response: *response,
            features,
            prediction,
            attribution,
            report,
        })
    }

    /// Two predictions; `response` is left as submitted
    pub fn compare(&self, response: &RawResponse, field: BinaryField) -> CoreResult<Counterfactual> {
        let flipped = response.flipped(field);
        let comparison = self.predictor.compare(&encode(response), &encode(&flipped))?;

        log::debug!(
            "Counterfactual on {}: {:+.2} points",
            field,
            comparison.delta_points
        );

        Ok(Counterfactual {
            field,
            original: *response,
            flipped,
            original_text: comparison.original.percent_text(),
            flipped_text: comparison.counterfactual.percent_text(),
            comparison,
        })
    }
}
