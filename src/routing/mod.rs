//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Table Construction (at startup / reload):
//!     EndpointDeclaration[] (discovery order)
//!     → versioning::StrategyResolver (effective strategy)
//!     → expander.rs (path rewrite, or per-version sub-descriptors)
//!     → router.rs (OR-combine sub-descriptors)
//!     → conflict.rs (reject duplicate path+method claims)
//!     → table.rs (immutable RouteTable)
//!
//! Incoming Request (path, method, headers, query)
//!     → matcher.rs (evaluate path template and conditions)
//!     → http::dispatch picks the most specific match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same declarations always produce the same table
//! - Any construction error is fatal; partial tables are never published

pub mod conflict;
pub mod descriptor;
pub mod error;
pub mod expander;
pub mod matcher;
pub mod router;
pub mod table;

pub use conflict::ConflictDetector;
pub use descriptor::{
    ConditionSet, EndpointDeclaration, HandlerId, MethodSet, PassThrough, RequestMethod,
    RouteDescriptor,
};
pub use error::{RoutingError, RoutingResult};
pub use expander::RouteExpander;
pub use router::{OrCombine, RouteCombiner};
pub use table::RouteTable;
