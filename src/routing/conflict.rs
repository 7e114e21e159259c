//! Duplicate-route detection.
//!
//! # Responsibilities
//! - Remember which handler claimed each (path, methods, conditions)
//! - Reject a second handler whose claim cannot be told apart at dispatch
//!
//! # Conflict Rule
//! Two claims on the same literal path collide when their method sets
//! intersect, unless they are dispatch-disjoint:
//! - some condition name is constrained by both with disjoint values, or
//! - one claim's condition names strictly contain the other's (the more
//!   specific claim wins at dispatch)
//!
//! Path-strategy routes carry no conditions, so any repeat of path+method
//! collides. Header/Query variants of the same path are overloads as long as
//! their version values do not overlap.
//!
//! # Design Decisions
//! - Scoped to one table construction; a rebuild starts from an empty map
//! - A multi-path descriptor is checked once per path, all paths before any
//!   is recorded
//! - The same handler re-claiming its own route is not a conflict

use std::collections::{BTreeSet, HashMap};

use crate::routing::descriptor::{ConditionSet, HandlerId, MethodSet, RouteDescriptor};
use crate::routing::error::{RoutingError, RoutingResult};

#[derive(Debug, Clone)]
struct Claim {
    methods: MethodSet,
    headers: ConditionSet,
    queries: ConditionSet,
    handler: HandlerId,
}

impl Claim {
    fn from_descriptor(descriptor: &RouteDescriptor) -> Self {
        Self {
            methods: descriptor.methods().clone(),
            headers: descriptor.header_conditions().clone(),
            queries: descriptor.query_conditions().clone(),
            handler: descriptor.handler().clone(),
        }
    }

    fn condition_names(&self) -> BTreeSet<(char, &str)> {
        self.headers
            .names()
            .map(|n| ('h', n))
            .chain(self.queries.names().map(|n| ('q', n)))
            .collect()
    }

    fn collides_with(&self, other: &Claim) -> bool {
        self.methods.intersects(&other.methods) && !self.dispatch_disjoint(other)
    }

    fn dispatch_disjoint(&self, other: &Claim) -> bool {
        if self.headers.excludes(&other.headers) || self.queries.excludes(&other.queries) {
            return true;
        }
        let mine = self.condition_names();
        let theirs = other.condition_names();
        mine != theirs && (mine.is_superset(&theirs) || theirs.is_superset(&mine))
    }
}

/// Registration bookkeeping for one table-construction pass.
#[derive(Debug, Default)]
pub struct ConflictDetector {
    claims: HashMap<String, Vec<Claim>>,
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every path of `descriptor` for its handler.
    ///
    /// Fails with `DuplicateRoute` naming the first handler that already
    /// owns a colliding claim; nothing is recorded in that case.
    pub fn register(&mut self, descriptor: &RouteDescriptor) -> RoutingResult<()> {
        let claim = Claim::from_descriptor(descriptor);

        for path in descriptor.paths() {
            let existing = self
                .claims
                .get(path)
                .into_iter()
                .flatten()
                .find(|c| c.handler != claim.handler && c.collides_with(&claim));

            if let Some(existing) = existing {
                return Err(RoutingError::DuplicateRoute {
                    path: path.clone(),
                    existing: existing.handler.clone(),
                    new: claim.handler.clone(),
                });
            }
        }

        for path in descriptor.paths() {
            self.claims.entry(path.clone()).or_default().push(claim.clone());
        }
        Ok(())
    }

    /// Number of distinct literal paths claimed so far.
    pub fn path_count(&self) -> usize {
        self.claims.len()
    }

    /// Handlers that claimed `path`, in registration order.
    pub fn owners(&self, path: &str) -> Vec<&HandlerId> {
        self.claims
            .get(path)
            .map(|claims| claims.iter().map(|c| &c.handler).collect())
            .unwrap_or_default()
    }
}
