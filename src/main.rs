use std::sync::Arc;

use anyhow::Context;
use orian_chat::{
    config::RelayConfig, routes, services::completion::OpenAiClient, state::AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::from_env()?;
    let completion = OpenAiClient::new(config.completion.clone())
        .context("failed to build completion client")?;
    let state = Arc::new(AppState::new(Arc::new(completion)));

    let app = routes::create_router(&config.static_dir).with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        model = %config.completion.model,
        "King Orian relay listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
