//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, incl. one per registered route)
//!     → metrics.rs (route count, request counters and latency)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the dispatch span
//! - Metrics are cheap and no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
