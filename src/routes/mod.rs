// src/routes/mod.rs
pub mod admin;
pub mod chat;
pub mod client;

use std::path::Path;

use crate::state::SharedState;
use admin::{get_activity_handler, get_metrics_handler, get_sessions_handler};
use axum::{
    Router,
    routing::{get, post},
};
use chat::{chat_handler, connect_handler, render_handler};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(public_dir: impl AsRef<Path>) -> Router<SharedState> {
    let api_routes = Router::new()
        .route("/chat", post(chat_handler))
        .route("/render", post(render_handler))
        .route("/connect", post(connect_handler));

    let admin_routes = Router::new()
        .route("/activity", get(get_activity_handler))
        .route("/sessions", get(get_sessions_handler))
        .route("/metrics", get(get_metrics_handler));

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
}
