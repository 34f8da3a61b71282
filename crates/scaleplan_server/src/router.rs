//! Route table and server startup.

use crate::state::AppState;
use crate::{sessions, stateless};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use scaleplan_core::ServerSettings;
use scaleplan_error::{HttpError, ScaleplanResult};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use std::time::Duration;
use tracing::{error, info, instrument};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Builds the full route table.
///
/// Endpoints:
/// - `GET  /health`
/// - `POST /api/workflow/extract` (also `/api/workflow/screenshots`)
/// - `POST /api/workflow/plan`
/// - `POST /api/workflow/refine`
/// - `POST /api/workflow/evaluate`
/// - `POST /api/workflow/storyboard`
/// - `POST /api/sessions`
/// - `GET|DELETE /api/sessions/:id`
/// - `POST /api/sessions/:id/{start,changes,approve,retry,reset}`
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let workflow = Router::new()
        .route("/extract", post(stateless::extract))
        .route("/screenshots", post(stateless::extract))
        .route("/plan", post(stateless::plan))
        .route("/refine", post(stateless::refine))
        .route("/evaluate", post(stateless::evaluate))
        .route("/storyboard", post(stateless::storyboard));

    let session_routes = Router::new()
        .route("/", post(sessions::create))
        .route("/:id", get(sessions::get).delete(sessions::delete))
        .route("/:id/start", post(sessions::start))
        .route("/:id/changes", post(sessions::changes))
        .route("/:id/approve", post(sessions::approve))
        .route("/:id/retry", post(sessions::retry))
        .route("/:id/reset", post(sessions::reset));

    Router::new()
        .route("/health", get(health))
        .nest("/api/workflow", workflow)
        .nest("/api/sessions", session_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves until Ctrl+C.
///
/// # Errors
///
/// Returns an HTTP error if the address cannot be bound or the server fails.
#[instrument(skip_all, fields(host = %settings.host, port = settings.port))]
pub async fn serve(state: AppState, settings: &ServerSettings) -> ScaleplanResult<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HttpError::new(format!("Failed to bind {}: {}", addr, e)))?;
    info!(addr = %addr, "Listening");

    if settings.session_idle_secs > 0 {
        spawn_session_sweeper(
            state.clone(),
            Duration::from_secs(settings.session_idle_secs),
        );
    }

    axum::serve(listener, router(state, settings.max_body_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HttpError::new(format!("Server error: {}", e)))?;

    info!("Server shut down");
    Ok(())
}

/// Periodically drops sessions nobody has touched for `max_idle`.
fn spawn_session_sweeper(state: AppState, max_idle: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(max_idle.min(SWEEP_INTERVAL));
        loop {
            ticker.tick().await;
            let expired = state.sweep_idle(max_idle).await;
            if expired > 0 {
                let remaining = state.session_count().await;
                info!(expired, remaining, "Expired idle sessions");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
}
