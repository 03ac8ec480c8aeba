//! HTTP surface
//!
//! | Method | Path            | Success             |
//! |--------|-----------------|---------------------|
//! | GET    | /songs          | 200, array of songs |
//! | GET    | /songText/{id}  | 200, `{text}`       |
//! | DELETE | /song/{id}      | 204                 |
//! | PUT    | /song/{id}      | 204                 |
//! | POST   | /song           | 204                 |
//!
//! The OpenAPI document is at `/api-docs/openapi.json`, Swagger UI at `/swagger/`.

pub mod error;
pub mod middleware;
pub mod openapi;
pub mod songs;

use crate::catalog::SongRepository;
use crate::songinfo::SongInfoClient;
use anyhow::Context;
use axum::Router;
use axum::routing::{get, post, put};
use error::ApiError;
use openapi::ApiDoc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared by all handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn SongRepository>,
    pub info: SongInfoClient,
}

impl AppState {
    pub fn new(repo: Arc<dyn SongRepository>, info: SongInfoClient) -> Self {
        Self { repo, info }
    }
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/songs", get(songs::list_songs))
        .route("/songText/{id}", get(songs::song_text))
        .route("/song/{id}", put(songs::update_song).delete(songs::delete_song))
        .route("/song", post(songs::add_song))
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            request_timeout,
            middleware::timeout,
        ))
        .layer(axum::middleware::from_fn(middleware::json_content_type))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

/// Serve until Ctrl+C. Returns once in-flight requests have drained.
pub async fn serve(state: AppState, addr: SocketAddr, request_timeout: Duration) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, router(state, request_timeout))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve http")?;

    info!("server stopped");
    Ok(())
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received, shutting down"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
