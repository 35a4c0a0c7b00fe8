//! Ratings Server
//!
//! Serves power rankings over HTTP from PostgreSQL, or from a JSON snapshot
//! when `--snapshot` is given.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use ratings_gateway::logging::initialize_logging;
use ratings_gateway::shutdown::shutdown_signal;
use ratings_gateway::{
    create_routes, ApiSettings, GatewayConfig, InMemoryStore, PgRatingsStore, RatingsStore,
};

/// College football power ratings server
#[derive(Parser)]
#[command(name = "ratings-server")]
#[command(about = "Serves college football power rankings and percentiles")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve ratings from a JSON snapshot instead of the database
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Load configuration
    let mut config =
        GatewayConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    initialize_logging(&config.logging)?;
    info!("Starting Ratings Server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn RatingsStore> = match &args.snapshot {
        Some(path) => Arc::new(
            InMemoryStore::from_json_file(path)
                .await
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?,
        ),
        None => {
            info!("Using PostgreSQL store with up to {} connections", config.database.max_connections);
            Arc::new(
                PgRatingsStore::connect_lazy(&config.database)
                    .context("Failed to configure database pool")?,
            )
        }
    };

    let addr = config.server_addr().context("Invalid bind address")?;
    let routes = create_routes(store.clone(), ApiSettings::from(&config));

    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        "Serving {} season rankings on http://{}",
        config.rankings.current_season, bound
    );
    server.await;

    info!("Shutdown signal received, closing store");
    store.close().await;
    info!("Ratings Server shutdown complete");
    Ok(())
}
