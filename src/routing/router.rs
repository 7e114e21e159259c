//! Router-side condition combination.
//!
//! # Responsibilities
//! - OR-combine single-valued descriptors into one multi-valued descriptor
//!
//! # Design Decisions
//! - Lives with the router abstraction; the expander only asks for it
//! - Only descriptors of identical shape (handler, methods, paths,
//!   pass-through) can be combined
//! - Values of a shared condition name are unioned in first-seen order

use crate::routing::descriptor::RouteDescriptor;
use crate::routing::error::{RoutingError, RoutingResult};

/// Merges per-version descriptors into one dispatchable descriptor.
pub trait RouteCombiner: Send + Sync + std::fmt::Debug {
    /// Combine `next` into `acc`.
    fn combine(
        &self,
        acc: RouteDescriptor,
        next: RouteDescriptor,
    ) -> RoutingResult<RouteDescriptor>;

    /// Left fold over `parts`. `None` when there is nothing to combine.
    fn reduce(&self, parts: Vec<RouteDescriptor>) -> RoutingResult<Option<RouteDescriptor>> {
        let mut combined: Option<RouteDescriptor> = None;
        for part in parts {
            combined = Some(match combined {
                None => part,
                Some(acc) => self.combine(acc, part)?,
            });
        }
        Ok(combined)
    }
}

/// Logical OR across the values of each condition name.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrCombine;

impl RouteCombiner for OrCombine {
    fn combine(
        &self,
        mut acc: RouteDescriptor,
        next: RouteDescriptor,
    ) -> RoutingResult<RouteDescriptor> {
        if !acc.same_shape(&next) {
            return Err(RoutingError::invalid(
                acc.handler(),
                "cannot combine descriptors with different methods or paths",
            ));
        }
        acc.merge_conditions(&next);
        Ok(acc)
    }
}
