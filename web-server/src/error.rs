//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use empleo_core::CoreError;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Input errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Model contract errors
    #[error("Configuration drift: {0}")]
    ConfigurationDrift(String),
    #[error("Attribution error: {0}")]
    AttributionError(String),
    #[error("Inference error: {0}")]
    InferenceError(String),

    // Generic errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfigurationDrift(_)
            | AppError::AttributionError(_)
            | AppError::InferenceError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user; server-side details are logged instead
    pub fn user_message(&self) -> &str {
        match self {
            AppError::ValidationError(msg) => msg.as_str(),
            AppError::NotFound(msg) => msg.as_str(),
            AppError::ConfigurationDrift(_) => {
                tracing::error!("{}", self);
                "El modelo no coincide con las variables del formulario"
            }
            AppError::AttributionError(_) => {
                tracing::error!("{}", self);
                "No fue posible calcular la explicación de la predicción"
            }
            AppError::InferenceError(_) => {
                tracing::error!("{}", self);
                "No fue posible calcular la predicción"
            }
            AppError::InternalError(_) => {
                tracing::error!("{}", self);
                "Internal server error"
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.user_message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigurationDrift { .. } | CoreError::Layout(_) => AppError::ConfigurationDrift(err.to_string()),
            CoreError::InvalidResponse(e) => AppError::ValidationError(e.to_string()),
            CoreError::Attribution(e) => AppError::AttributionError(e.to_string()),
            CoreError::Inference(e) => AppError::InferenceError(e.to_string()),
            CoreError::Artifact(e) => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("Inference task failed: {}", err))
    }
}
