use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use n8n_chat_relay::{
    config::Config, routes, services::activity_log::ActivityLogger, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            tracing::error!(
                "Please create a .env file with N8N_WEBHOOK_URL or set it in your environment"
            );
            return Err(e.into());
        }
    };

    let activity = ActivityLogger::connect(config.log_dir.as_deref()).await;
    let state = Arc::new(AppState::new(&config, activity).context("building webhook client")?);

    let app = routes::create_router(&config.public_dir)
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(webhook = %config.webhook_url, "Server running on http://localhost:{}", config.port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
