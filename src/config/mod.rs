//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, unknown strategy = parse error)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → manifest.rs (controllers → EndpointDeclaration[])
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → route table rebuilt from scratch
//!     → atomic swap of the served snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod manifest;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use manifest::{extract_declarations, ApiVersionConfig, ControllerConfig, EndpointConfig};
pub use schema::{AppConfig, ListenerConfig, LogFormat, ObservabilityConfig};
pub use validation::ValidationError;
