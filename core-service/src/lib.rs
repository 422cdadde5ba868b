//! Employment probability explainer core
//!
//! Encodes a questionnaire into the classifier's feature vector, predicts the
//! probability of being employed and breaks it down per feature.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{CoreError, CoreResult};
pub use logic::explain::{AttributionSource, ExplainerManifest, OnnxExplainer, ShapleyExplainer};
pub use logic::features::{encode, BinaryField, FeatureVector, LayoutInfo, RawResponse};
pub use logic::model::{Classifier, ModelManifest, OnnxClassifier, Prediction};
pub use logic::report::{Report, ReportOptions};
pub use logic::{Counterfactual, Evaluation, Pipeline};
