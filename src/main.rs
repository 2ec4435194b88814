use a2a_inspector::config::Cli;
use a2a_inspector::inspector::{router, AppState};
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.config();
    let addr = config
        .bind_addr()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    let app = router(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("A2A inspector listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
