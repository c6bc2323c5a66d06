use anyhow::{Context, Result};
use serlink::bridge::Bridge;
use serlink::config::{load_config, SerlinkConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serlink=info".into()),
        )
        .init();

    info!("Serlink starting...");

    // Optional config file as the first argument; built-in defaults otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => SerlinkConfig::default(),
    };

    let mut bridge = match Bridge::new(&config).await {
        Ok(bridge) => bridge,
        Err(e) => {
            error!(error = %e, "bridge startup failed");
            return Err(e);
        }
    };

    bridge.start()?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    bridge.close().await;

    Ok(())
}
