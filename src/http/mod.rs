//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID assigned or kept)
//!     → dispatch.rs (path → method → version → handler)
//!     → handler response, or 404 / 405
//! ```

pub mod dispatch;
pub mod request;
pub mod server;

pub use dispatch::{echo, HandlerRegistry, MatchedRoute, RouteSnapshot, Selection};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
