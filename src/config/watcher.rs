//! Configuration file watcher for hot reload.
//!
//! Every change rebuilds the route table from scratch; the server swaps the
//! new table in atomically. A reload that fails to load or build is logged
//! and the current table stays in force.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::lifecycle::startup::build_route_table;
use crate::routing::RouteTable;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouteTable>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt route tables.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteTable>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, rebuilding route table...");
                        match reload(&path) {
                            Ok(table) => {
                                tracing::info!(routes = table.len(), "Route table rebuilt");
                                let _ = tx.send(table);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload routes, keeping current table"
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn reload(path: &Path) -> Result<RouteTable, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    Ok(build_route_table(&config)?)
}
