//! API versioning route resolution.
//!
//! Turns endpoint declarations carrying API versions into a conflict-free
//! route table, then serves it over HTTP.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod versioning;

pub use config::schema::AppConfig;
pub use http::{HandlerRegistry, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::{EndpointDeclaration, RouteDescriptor, RouteTable, RoutingError};
pub use versioning::{Strategy, StrategyOverride, StrategyResolver, VersionPolicy};
