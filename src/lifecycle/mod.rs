//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Extract declarations → Build route table
//!     → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C / SIGTERM → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any config or routing error stops startup
//! - The listener binds only after the route table is complete

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_route_table, StartupError};
