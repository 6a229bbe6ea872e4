use std::sync::Arc;
use anyhow::Context;
use repo_challenge::{
    api::{self, AppState},
    ChallengeRanker, Config,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::load()?;
    config.validate().context("invalid configuration")?;

    let ranker = Arc::new(ChallengeRanker::from_config(&config)?);
    let app = api::router(AppState::new(ranker));

    info!("repo-challenge web server starting...");
    info!("LLM provider: {} ({})", config.llm.provider, config.llm.model());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!("Server listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
