//! API versioning policy subsystem.
//!
//! # Data Flow
//! ```text
//! [apiversioning] config section
//!     → policy.rs (VersionPolicy: global strategy, header, query param, base path)
//!
//! Per endpoint (at table construction):
//!     StrategyOverride + VersionPolicy
//!     → strategy.rs (StrategyResolver)
//!     → effective Strategy handed to routing::expander
//! ```
//!
//! # Design Decisions
//! - Policy is loaded once and read-only afterwards
//! - Strategy domain is closed; unknown values fail config parsing
//! - Endpoint overrides beat global policy, no other precedence levels

pub mod policy;
pub mod strategy;

pub use policy::{Strategy, VersionPolicy};
pub use strategy::{StrategyOverride, StrategyResolver};
