use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use empleo_core::logic::explain::reference_background;
use empleo_core::logic::model::{InferenceError, ModelMetadata};
use empleo_core::{Classifier, Pipeline, ReportOptions, ShapleyExplainer};
use ndarray::{Array2, ArrayView2};
use tower::ServiceExt;

use crate::config::Config;
use crate::session::SESSION_COOKIE;
use crate::{create_router, AppState};

/// p = 0.5 + 0.1·indigenous_identity + 0.01·(education - 12)
struct StubModel {
    metadata: ModelMetadata,
}

impl Classifier for StubModel {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict_proba(&self, batch: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError> {
        let mut out = Array2::zeros((batch.nrows(), 2));
        for (i, row) in batch.rows().into_iter().enumerate() {
            let p = 0.5 + 0.1 * row[9] + 0.01 * (row[3] - 12.0);
            out[[i, 0]] = 1.0 - p;
            out[[i, 1]] = p;
        }
        Ok(out)
    }
}

fn app() -> Router {
    let model: Arc<dyn Classifier> = Arc::new(StubModel {
        metadata: ModelMetadata::new("stub", 10),
    });
    let explainer = ShapleyExplainer::new(model.clone(), reference_background()).unwrap();
    let pipeline = Pipeline::new(model, Arc::new(explainer), ReportOptions::default()).unwrap();
    create_router(AppState::new(pipeline, Config::default()))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn baseline_json() -> serde_json::Value {
    serde_json::json!({
        "head_of_household": "No",
        "gender": "Mujer",
        "rural": "No",
        "indigenous_language": "No",
        "married": "No",
        "indigenous_identity": "No",
        "education_years": 12,
        "age": 30
    })
}

fn session_cookie_of(response: &axum::response::Response) -> String {
    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    let pair = set_cookie.split(';').next().unwrap();
    assert!(pair.starts_with(SESSION_COOKIE));
    pair.to_string()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "stub");
}

#[tokio::test]
async fn test_intro_until_dismissed() {
    let app = app();

    let first = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let cookie = session_cookie_of(&first);
    assert!(body_string(first).await.contains("/intro/dismiss"));

    let dismissed = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/intro/dismiss")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(dismissed.status(), StatusCode::SEE_OTHER);
    assert_eq!(dismissed.headers().get(header::LOCATION).unwrap(), "/");
    assert_eq!(session_cookie_of(&dismissed), cookie);

    let after = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let html = body_string(after).await;
    assert!(html.contains("action=\"/predict\""));

    // Another browser still sees the intro
    let other = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(body_string(other).await.contains("/intro/dismiss"));
}

#[tokio::test]
async fn test_form_submission_renders_result() {
    let form = "head_of_household=No&gender=Mujer&rural=No&indigenous_language=No\
                &married=No&indigenous_identity=S%C3%AD&education_years=12&age=30";
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("60.00%"));
    assert!(html.contains("Se identifica como indígena"));
}

#[tokio::test]
async fn test_form_out_of_range_is_rejected() {
    let form = "head_of_household=No&gender=Mujer&rural=No&indigenous_language=No\
                &married=No&indigenous_identity=No&education_years=12&age=14";
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("La edad debe estar entre 15 y 100"));
}

#[tokio::test]
async fn test_form_unknown_option_renders_error_page() {
    let form = "head_of_household=No&gender=Otro&rural=No&indigenous_language=No\
                &married=No&indigenous_identity=No&education_years=12&age=30";
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_string(response).await;
    assert!(html.contains("no es una opción válida"));
    assert!(html.contains("Volver al formulario"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app()
        .oneshot(Request::builder().uri("/no-such-page").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 404);
    assert_eq!(body["error"], "Ruta no encontrada: /no-such-page");
}

#[tokio::test]
async fn test_api_predict() {
    let response = app()
        .oneshot(json_request("/api/v1/predict", baseline_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["probability_text"], "50.00%");
    assert_eq!(body["features"]["EDAD2"], 900.0);
    assert_eq!(body["report"]["rows"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_api_predict_top_n() {
    let mut request = baseline_json();
    request["top_n"] = serde_json::json!(3);
    request["education_years"] = serde_json::json!(16);

    let response = app().oneshot(json_request("/api/v1/predict", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let rows = body["report"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["feature"], "ESCOACUM");
    assert_eq!(rows[0]["direction"], "increases");
}

#[tokio::test]
async fn test_api_unknown_option_is_client_error() {
    let mut request = baseline_json();
    request["gender"] = serde_json::json!("Otro");

    let response = app().oneshot(json_request("/api/v1/predict", request)).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_api_education_out_of_range() {
    let mut request = baseline_json();
    request["education_years"] = serde_json::json!(31);

    let response = app().oneshot(json_request("/api/v1/predict", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_api_compare() {
    let mut request = baseline_json();
    request["flip"] = serde_json::json!("indigenous_identity");

    let response = app().oneshot(json_request("/api/v1/compare", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["field"], "indigenous_identity");
    assert_eq!(body["original"]["indigenous_identity"], "No");
    assert_eq!(body["flipped"]["indigenous_identity"], "Sí");
    assert_eq!(body["original_text"], "50.00%");
    assert_eq!(body["flipped_text"], "60.00%");
}

#[tokio::test]
async fn test_model_info() {
    let response = app()
        .oneshot(Request::builder().uri("/api/v1/model").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["layout"]["feature_count"], 10);
    assert_eq!(body["explainer"]["name"], "exact-shapley");
    assert_eq!(body["explainer"]["layout"], "class_axis");
}
