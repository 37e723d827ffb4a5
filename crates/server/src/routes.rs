pub mod captions;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::captions::CaptionStore;

use crate::observability;
use crate::openapi::ApiDoc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub captions: Arc<dyn CaptionStore>,
}

impl AppState {
    pub fn new(captions: Arc<dyn CaptionStore>) -> Self {
        Self { captions }
    }
}

/// Router knobs that come from configuration.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub static_dir: String,
    pub max_body_bytes: usize,
}

impl From<&configs::ServerConfig> for RouterOptions {
    fn from(cfg: &configs::ServerConfig) -> Self {
        Self { static_dir: cfg.static_dir.clone(), max_body_bytes: cfg.max_body_bytes }
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            static_dir: configs::DEFAULT_STATIC_DIR.to_string(),
            max_body_bytes: configs::DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> impl IntoResponse {
    observability::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: caption API, health, metrics, docs,
/// and the gallery's static files as fallback.
pub fn build_router(state: AppState, opts: RouterOptions, cors: CorsLayer) -> Router {
    let index = format!("{}/index.html", opts.static_dir.trim_end_matches('/'));
    let static_dir = ServeDir::new(&opts.static_dir).fallback(ServeFile::new(index));

    let api = Router::new()
        .route(
            "/api/captions",
            get(captions::get_captions).post(captions::set_caption),
        )
        .layer(DefaultBodyLimit::max(opts.max_body_bytes));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(api)
        .fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
