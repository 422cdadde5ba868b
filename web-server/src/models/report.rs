//! Response payloads of the JSON API

use empleo_core::logic::explain::OutputLayout;
use empleo_core::logic::model::{EngineStatus, ModelMetadata};
use empleo_core::{Evaluation, LayoutInfo, Pipeline, Report};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub probability: f32,
    pub probability_text: String,
    /// Encoded vector by feature name
    pub features: BTreeMap<String, f32>,
    pub report: Report,
}

impl From<Evaluation> for PredictResponse {
    fn from(evaluation: Evaluation) -> Self {
        let features = evaluation
            .features
            .feature_names()
            .iter()
            .zip(evaluation.features.as_slice())
            .map(|(name, value)| (name.to_string(), *value))
            .collect();

        Self {
            probability: evaluation.prediction.probability,
            probability_text: evaluation.report.probability_text.clone(),
            features,
            report: evaluation.report,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExplainerInfo {
    pub name: String,
    pub layout: OutputLayout,
}

/// `GET /api/v1/model`
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub layout: LayoutInfo,
    pub model: ModelMetadata,
    pub explainer: ExplainerInfo,
    pub status: EngineStatus,
    pub top_features: usize,
}

impl ModelInfo {
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        Self {
            layout: pipeline.layout_info(),
            model: pipeline.predictor().metadata().clone(),
            explainer: ExplainerInfo {
                name: pipeline.explainer().source_name().to_string(),
                layout: pipeline.explainer().layout(),
            },
            status: pipeline.predictor().status(),
            top_features: pipeline.options().top_n,
        }
    }
}
