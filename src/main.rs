use std::sync::Arc;

use anyhow::Context;
use keygate::config::{load_credentials_from_env, ConfigLoader, GatewaySettings};
use keygate::server::{self, AppState};
use keygate::Gateway;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keygate=info")),
        )
        .init();

    let settings = GatewaySettings::from_env().context("invalid gateway settings")?;
    let providers = ConfigLoader::new()
        .context("failed to load provider config")?
        .into_config();
    let credentials = load_credentials_from_env().context("failed to load LLM_KEYS")?;

    let gateway = Gateway::from_config(&providers, settings.strategy, credentials)
        .context("failed to build gateway")?;
    let state = Arc::new(AppState::new(gateway, settings.env_file.clone()));

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", settings.bind_addr))?;
    tracing::info!(addr = %settings.bind_addr, "Keygate listening");

    server::serve(listener, state).await.context("server error")?;
    Ok(())
}
