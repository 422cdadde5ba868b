//! Health check handler

use axum::{extract::State, http::Uri, Json};
use serde::Serialize;

use crate::{AppError, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.pipeline.predictor().metadata().name.clone(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!("No route for {}", uri);
    AppError::NotFound(format!("Ruta no encontrada: {}", uri.path()))
}
