//! Pre-built attribution graph (ONNX)
//!
//! Some toolchains export tree contributions as a separate graph. Its output
//! tensor has no self-describing class axis, so the manifest must declare the
//! layout; the tensor is reshaped according to that declaration only.

use std::path::Path;

use ndarray::{Array2, Array3, ArrayView2, Axis};
use ort::session::Session;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::constants::DEFAULT_INPUT_NAME;
use crate::logic::model::onnx::{build_session, check_ports, run_session};
use crate::logic::model::read_artifact;

use super::engine::AttributionSource;
use super::types::{AttributionError, AttributionOutput, OutputLayout, RawAttribution};

fn default_input_name() -> String {
    DEFAULT_INPUT_NAME.to_string()
}

fn default_output_name() -> String {
    "contributions".to_string()
}

/// JSON sidecar of an attribution graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainerManifest {
    pub name: String,
    /// `per_class` tensors are `(classes, samples, features)`,
    /// `class_axis` tensors `(samples, features, classes)`,
    /// `single_output` tensors `(samples, features)`
    pub layout: OutputLayout,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
    pub expected_value: Vec<f32>,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl ExplainerManifest {
    pub fn load(path: &Path) -> CoreResult<Self> {
        Ok(crate::logic::model::artifact::read_json(path)?)
    }
}

pub struct OnnxExplainer {
    session: Mutex<Session>,
    manifest: ExplainerManifest,
}

impl OnnxExplainer {
    pub fn load(path: &Path, manifest: ExplainerManifest, expected_sha256: Option<&str>) -> CoreResult<Self> {
        log::info!("Loading attribution graph from: {}", path.display());

        let checksum = expected_sha256.or(manifest.sha256.as_deref());
        let bytes = read_artifact(path, checksum)?;
        let session = build_session(&bytes)?;
        check_ports(&session, &manifest.input_name, &manifest.output_name)?;

        log::info!(
            "Attribution graph '{}' loaded (layout {}, output '{}')",
            manifest.name,
            manifest.layout,
            manifest.output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            manifest,
        })
    }
}

/// Interpret a flat tensor according to the declared layout
pub fn reshape_output(layout: OutputLayout, shape: &[usize], data: Vec<f32>) -> Result<AttributionOutput, AttributionError> {
    let unrecognized = || AttributionError::UnrecognizedShape {
        layout,
        shape: shape.to_vec(),
    };

    match (layout, shape) {
        (OutputLayout::PerClass, &[classes, samples, features]) => {
            let stacked = Array3::from_shape_vec((classes, samples, features), data).map_err(|_| unrecognized())?;
            Ok(AttributionOutput::PerClass(
                stacked.axis_iter(Axis(0)).map(|m| m.to_owned()).collect(),
            ))
        }
        (OutputLayout::ClassAxis, &[samples, features, classes]) => {
            let array = Array3::from_shape_vec((samples, features, classes), data).map_err(|_| unrecognized())?;
            Ok(AttributionOutput::ClassAxis(array))
        }
        (OutputLayout::SingleOutput, &[samples, features]) => {
            let matrix = Array2::from_shape_vec((samples, features), data).map_err(|_| unrecognized())?;
            Ok(AttributionOutput::SingleOutput(matrix))
        }
        _ => Err(unrecognized()),
    }
}

impl AttributionSource for OnnxExplainer {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn layout(&self) -> OutputLayout {
        self.manifest.layout
    }

    fn explain(&self, batch: ArrayView2<'_, f32>) -> Result<RawAttribution, AttributionError> {
        let (shape, data) = run_session(&self.session, batch, &self.manifest.input_name, &self.manifest.output_name)?;
        let output = reshape_output(self.manifest.layout, &shape, data)?;

        Ok(RawAttribution {
            output,
            expected_value: self.manifest.expected_value.clone(),
        })
    }
}
