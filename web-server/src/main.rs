//! Employment Probability Web Server
//!
//! Serves the questionnaire and returns the predicted probability of being
//! employed together with a per-feature explanation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       EMPLEO WEB                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌──────────────────────────┐  │
//! │  │  HTML     │  │  JSON     │  │  Session store           │  │
//! │  │  form     │  │  API      │  │  (intro dismissed)       │  │
//! │  └─────┬─────┘  └─────┬─────┘  └──────────────────────────┘  │
//! │        └──────┬───────┘                                      │
//! │               ▼                                              │
//! │   ┌──────────────────────────────────────────────────────┐   │
//! │   │ empleo-core: encode → predict → explain → rank       │   │
//! │   └──────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod handlers;
mod models;
mod render;
mod session;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use empleo_core::Pipeline;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "empleo_web=debug,empleo_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("{} v{} starting...", empleo_core::constants::APP_NAME, empleo_core::constants::APP_VERSION);
    tracing::info!("Model: {}", config.model_path.display());

    // Load model and explainer once
    let pipeline = engine::build_pipeline(&config)?;

    // Build application state
    let state = AppState::new(pipeline, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub sessions: Arc<session::SessionStore>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: config::Config) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(session::SessionStore::new(config.session_ttl_minutes)),
            config,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Browser pages
    let page_routes = Router::new()
        .route("/", get(handlers::intro::index))
        .route("/intro/dismiss", post(handlers::intro::dismiss))
        .route("/form", get(handlers::predict::form))
        .route("/predict", post(handlers::predict::submit));

    // JSON API
    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict", post(handlers::predict::api_predict))
        .route("/api/v1/compare", post(handlers::predict::api_compare))
        .route("/api/v1/model", get(handlers::predict::model_info));

    let cors = if state.config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Combine all routes
    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .fallback(handlers::health::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
