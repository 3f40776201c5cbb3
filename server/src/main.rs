//! Ratewise server binary.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratewise_server::{app_router, build_state, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Ratewise server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let state = build_state(&config);
    let app = app_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(
        listen_addr = %config.listen_addr,
        listen_port = %config.listen_port,
        cache_ttl_secs = config.cache.ttl.as_secs(),
        ttl_scope = ?config.cache.scope,
        require_auth = config.require_auth,
        "Ratewise server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        })
        .await?;

    info!("Ratewise server shutdown complete");
    Ok(())
}
