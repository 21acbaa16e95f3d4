use clap::Parser;
use portal_gateway::{telemetry, App, AppState, Cli};
use portal_redirector::RedirectorService;
use portal_shortener::ShortenerService;
use portal_storage::InMemoryStore;
use portal_sweeper::ExpirationSweeper;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();
    telemetry::init(config.log_format)?;

    let generator = config.generator()?;

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        code_length = generator.length(),
        max_allocation_attempts = config.max_allocation_attempts,
        sweep_interval_secs = config.sweep_interval_secs,
        log_format = %config.log_format,
        "starting gateway server"
    );

    let store = Arc::new(InMemoryStore::new());
    let shortener = ShortenerService::new(Arc::clone(&store), generator)
        .with_settings(config.shortener_settings());
    let redirector = RedirectorService::new(Arc::clone(&store));
    let sweeper = ExpirationSweeper::new(Arc::clone(&store))
        .with_settings(config.sweeper_settings())
        .spawn();

    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(redirector),
        config.public_base_url,
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await?;
    info!("gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c; shutting down");
    }
}
