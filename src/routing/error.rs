//! Routing error definitions.

use thiserror::Error;

use crate::routing::descriptor::HandlerId;

/// Errors raised while building the route table.
///
/// Both kinds are fatal at startup: the table is discarded and the process
/// must not begin serving traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// A declaration is missing required shape (e.g. no path patterns).
    #[error("Invalid declaration for {handler}: {reason}")]
    InvalidDeclaration { handler: HandlerId, reason: String },

    /// Two declarations claim the same path and method.
    #[error("Duplicate mapping: {path} already mapped to {existing} and now {new}")]
    DuplicateRoute {
        path: String,
        existing: HandlerId,
        new: HandlerId,
    },
}

impl RoutingError {
    pub fn invalid(handler: &HandlerId, reason: impl Into<String>) -> Self {
        RoutingError::InvalidDeclaration {
            handler: handler.clone(),
            reason: reason.into(),
        }
    }
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;
