//! API versioning service.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ config ──▶ manifest ──▶ EndpointDeclaration[]
//!                                                  │
//!                                                  ▼
//!                  versioning (strategy) ──▶ routing (expand, combine,
//!                                                  │   conflict-check)
//!                                                  ▼
//!     Client ─────────▶ http server ──▶ dispatch over RouteTable ──▶ handler
//!                                                  ▲
//!                         watcher (--watch) ───────┘ atomic swap
//! ```
//!
//! Every declared handler is served by the echo handler, which reports the
//! route that matched.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use api_versioning::config::{load_config, watcher::ConfigWatcher, AppConfig};
use api_versioning::http::{echo, HandlerRegistry, HttpServer};
use api_versioning::lifecycle::{build_route_table, Shutdown};
use api_versioning::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "api-versioning")]
#[command(about = "Serve a versioned API route table", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rebuild the route table when the config file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("api-versioning v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = %config.apiversioning.strategy,
        controllers = config.controllers.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let table = match build_route_table(&config) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(error = %e, "Route table construction failed");
            return Err(e.into());
        }
    };

    let registry = HandlerRegistry::new().with_fallback(echo);
    let server = HttpServer::new(config.listener.clone(), &table, registry)?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_signal());

    let (updates, _watcher) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (rx, Some(watcher.run()?))
        }
        _ => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener, updates, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
