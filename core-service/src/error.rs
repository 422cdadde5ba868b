//! Error handling

use crate::logic::explain::AttributionError;
use crate::logic::features::{LayoutMismatchError, ResponseError};
use crate::logic::model::{ArtifactError, InferenceError};

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Encoder and model disagree on the input width. Never padded or truncated.
    #[error("configuration drift: feature vector has {actual} values but the classifier expects {expected}")]
    ConfigurationDrift { expected: usize, actual: usize },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error(transparent)]
    InvalidResponse(#[from] ResponseError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Attribution(#[from] AttributionError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
