// server/src/main.rs

use common_utils::GateConfig;
use orchestrator::DecisionOrchestrator;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("[Server] Initializing...");
    let config = GateConfig::from_env();

    info!("[Server] Initializing DecisionOrchestrator...");
    let orchestrator = DecisionOrchestrator::new(&config)?;
    let app = server::app(Arc::new(orchestrator));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("[Server] Memory gate listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
