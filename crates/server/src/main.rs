use server::config::Config;
use server::host::Host;
use server::registry;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    tracing::info!(
        engine = %config.engine.path,
        think_ms = config.think_time.as_millis() as u64,
        max_engine_failures = config.max_engine_failures,
        "Config loaded"
    );

    let registry = registry::default_registry(&config)?;
    tracing::info!(commands = ?registry.keywords().collect::<Vec<_>>(), "Plugins registered");

    let host = Host::bind(&config, registry).await?;
    tracing::info!("Listening on {}", host.local_addr()?);

    host.serve_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    Ok(())
}
