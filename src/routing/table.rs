//! Route table construction.
//!
//! # Responsibilities
//! - Walk declarations in discovery order
//! - Resolve strategy → expand → conflict-check → append
//! - Emit one registration event per route
//!
//! # Design Decisions
//! - All or nothing: the first error aborts and no partial table escapes
//! - Discovery order decides which handler is "existing" in a DuplicateRoute
//! - The finished table is immutable; reloads build a fresh one

use crate::routing::conflict::ConflictDetector;
use crate::routing::descriptor::{EndpointDeclaration, RouteDescriptor};
use crate::routing::error::RoutingResult;
use crate::routing::expander::RouteExpander;
use crate::routing::router::RouteCombiner;
use crate::versioning::{StrategyResolver, VersionPolicy};

/// The final registration list handed to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Build with the default OR-combining expander.
    pub fn build<'a, I>(declarations: I, policy: &VersionPolicy) -> RoutingResult<Self>
    where
        I: IntoIterator<Item = &'a EndpointDeclaration>,
    {
        Self::build_with(declarations, policy, &RouteExpander::new())
    }

    /// Build with a caller-supplied expander.
    pub fn build_with<'a, I, C>(
        declarations: I,
        policy: &VersionPolicy,
        expander: &RouteExpander<C>,
    ) -> RoutingResult<Self>
    where
        I: IntoIterator<Item = &'a EndpointDeclaration>,
        C: RouteCombiner,
    {
        let resolver = StrategyResolver::new();
        let mut detector = ConflictDetector::new();
        let mut routes = Vec::new();

        for declaration in declarations {
            let strategy = resolver.resolve(declaration.strategy(), policy);
            let descriptor = expander.expand(declaration, strategy, policy)?;

            if let Err(e) = detector.register(&descriptor) {
                tracing::error!(error = %e, "Route table construction aborted");
                return Err(e);
            }

            tracing::info!(
                paths = ?descriptor.paths(),
                handler = %descriptor.handler(),
                strategy = %strategy,
                versioned = declaration.is_versioned(),
                "Registered API route"
            );
            routes.push(descriptor);
        }

        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteDescriptor;
    type IntoIter = std::slice::Iter<'a, RouteDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
