//! Prediction handlers
//!
//! Inference is synchronous CPU work, so it runs on the blocking pool.

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use empleo_core::logic::report::ReportOptions;
use empleo_core::{Counterfactual, RawResponse};

use crate::models::{CompareRequest, ModelInfo, PredictRequest, PredictResponse, PredictionForm};
use crate::render;
use crate::{AppError, AppResult, AppState};

/// Form with default answers
pub async fn form() -> Html<String> {
    Html(render::form_page(&RawResponse::default()))
}

/// HTML errors: same status as the JSON API, rendered as a page
pub struct PageError(AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        (status, Html(render::error_page(self.0.user_message()))).into_response()
    }
}

/// Urlencoded form → result page
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<PredictionForm>, FormRejection>,
) -> Result<Html<String>, PageError> {
    let Form(form) = form.map_err(|rejection| {
        tracing::debug!("Rejected form: {}", rejection.body_text());
        AppError::ValidationError("Alguna de las respuestas no es una opción válida".to_string())
    })?;
    let response = form.into_raw()?;

    let pipeline = state.pipeline.clone();
    let evaluation = tokio::task::spawn_blocking(move || pipeline.evaluate(&response))
        .await
        .map_err(AppError::from)?
        .map_err(AppError::from)?;

    tracing::info!(
        "Prediction {} ({} rows)",
        evaluation.report.probability_text,
        evaluation.report.rows.len()
    );

    Ok(Html(render::result_page(&evaluation.response, &evaluation.report)))
}

/// JSON form → evaluation
pub async fn api_predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> AppResult<Json<PredictResponse>> {
    let response = req.form.into_raw()?;

    let defaults = *state.pipeline.options();
    let options = ReportOptions {
        top_n: req.top_n.unwrap_or(defaults.top_n),
        sort_key: req.sort_key.unwrap_or(defaults.sort_key),
    };

    let pipeline = state.pipeline.clone();
    let evaluation = tokio::task::spawn_blocking(move || pipeline.evaluate_with(&response, &options)).await??;

    Ok(Json(PredictResponse::from(evaluation)))
}

/// JSON form + field to flip → both predictions
pub async fn api_compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> AppResult<Json<Counterfactual>> {
    let response = req.form.into_raw()?;
    let field = req.flip;

    let pipeline = state.pipeline.clone();
    let counterfactual = tokio::task::spawn_blocking(move || pipeline.compare(&response, field)).await??;

    Ok(Json(counterfactual))
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(ModelInfo::from_pipeline(&state.pipeline))
}
