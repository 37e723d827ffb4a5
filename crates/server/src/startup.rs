use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::file::caption_store::FileCaptionStore;

use crate::errors::StartupError;
use crate::routes::{self, AppState, RouterOptions};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the file-backed store into the router.
/// One store per captions file; it owns the write lock for that file.
pub fn build_app(cfg: &AppConfig) -> Router {
    let store = FileCaptionStore::new(cfg.storage.captions_file.clone());
    info!(path = %store.path().display(), "caption store ready");
    let state = AppState::new(store);
    routes::build_router(state, RouterOptions::from(&cfg.server), build_cors())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    common::env::ensure_env(&cfg.server.static_dir, &cfg.storage.captions_file)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let app = build_app(&cfg);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    let local = listener.local_addr().map_err(|e| StartupError::Any(e.into()))?;
    info!(%local, static_dir = %cfg.server.static_dir, "starting caption server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    Ok(())
}
