//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Turn the manifest into declarations and build the route table
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No retry: the same inputs reproduce the same error

use std::path::Path;

use thiserror::Error;

use crate::config::{extract_declarations, load_config, AppConfig, ConfigError};
use crate::routing::{RouteTable, RoutingError};

/// Anything that prevents the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),
}

/// Build the route table for an already validated config.
pub fn build_route_table(config: &AppConfig) -> Result<RouteTable, RoutingError> {
    let declarations = extract_declarations(&config.controllers);
    tracing::debug!(
        declarations = declarations.len(),
        strategy = %config.apiversioning.strategy,
        "Building route table"
    );
    RouteTable::build(&declarations, &config.apiversioning)
}

/// Load `path` and build its route table.
pub fn load_and_build(path: &Path) -> Result<(AppConfig, RouteTable), StartupError> {
    let config = load_config(path)?;
    let table = build_route_table(&config)?;
    Ok((config, table))
}
