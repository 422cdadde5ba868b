//! One-time construction of the classifier, explainer and pipeline

use std::sync::Arc;

use anyhow::Context;
use empleo_core::logic::explain::{load_background, reference_background};
use empleo_core::logic::model::manifest_path_for;
use empleo_core::{
    AttributionSource, Classifier, ExplainerManifest, ModelManifest, OnnxClassifier, OnnxExplainer, Pipeline,
    ReportOptions, ShapleyExplainer,
};

use crate::config::Config;

pub fn load_classifier(config: &Config) -> anyhow::Result<Arc<dyn Classifier>> {
    let manifest = ModelManifest::load(&config.model_manifest_path)
        .with_context(|| format!("Failed to read model manifest {}", config.model_manifest_path.display()))?;

    let classifier = OnnxClassifier::load(&config.model_path, &manifest, config.model_sha256.as_deref())
        .with_context(|| format!("Failed to load model {}", config.model_path.display()))?;

    Ok(Arc::new(classifier))
}

pub fn load_explainer(config: &Config, classifier: Arc<dyn Classifier>) -> anyhow::Result<Arc<dyn AttributionSource>> {
    if let Some(path) = &config.explainer_path {
        let manifest_path = manifest_path_for(path);
        let manifest = ExplainerManifest::load(&manifest_path)
            .with_context(|| format!("Failed to read explainer manifest {}", manifest_path.display()))?;
        let explainer = OnnxExplainer::load(path, manifest, None)
            .with_context(|| format!("Failed to load explainer {}", path.display()))?;
        return Ok(Arc::new(explainer));
    }

    let background = match &config.background_path {
        Some(path) => load_background(
            path,
            classifier.input_width(),
            config.background_limit,
            config.background_seed,
        )
        .with_context(|| format!("Failed to load background {}", path.display()))?,
        None => {
            tracing::warn!("BACKGROUND_PATH not set, explaining against the reference individual");
            reference_background()
        }
    };

    let explainer = ShapleyExplainer::new(classifier, background).context("Failed to build Shapley explainer")?;
    Ok(Arc::new(explainer))
}

/// Classifier, explainer and pipeline from the configured artifacts
pub fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let classifier = load_classifier(config)?;
    let explainer = load_explainer(config, classifier.clone())?;

    let options = ReportOptions {
        top_n: config.top_features,
        ..ReportOptions::default()
    };

    Pipeline::new(classifier, explainer, options).context("Model does not match the form's feature layout")
}
