//! Version expansion of endpoint declarations.
//!
//! # Responsibilities
//! - Reject declarations with no usable shape
//! - Reject expanded paths that are not valid path templates
//! - Path strategy: rewrite every path once per version into one descriptor
//! - Header/Query strategy: one sub-descriptor per version, then OR-combine
//! - Unversioned declarations pass through unchanged
//!
//! # Design Decisions
//! - Versions are iterated in first-seen order with duplicates collapsed
//! - Expansion is pure: the same input always yields an equal descriptor
//! - The OR merge is delegated to a `RouteCombiner` (router-owned)

use indexmap::IndexSet;

use crate::routing::descriptor::{EndpointDeclaration, RouteDescriptor};
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::matcher::PathTemplate;
use crate::routing::router::{OrCombine, RouteCombiner};
use crate::versioning::{Strategy, VersionPolicy};

/// Turns declarations into concrete route descriptors.
#[derive(Debug, Clone, Default)]
pub struct RouteExpander<C = OrCombine> {
    combiner: C,
}

impl RouteExpander<OrCombine> {
    pub fn new() -> Self {
        Self { combiner: OrCombine }
    }
}

impl<C: RouteCombiner> RouteExpander<C> {
    /// Use a custom condition combiner.
    pub fn with_combiner(combiner: C) -> Self {
        Self { combiner }
    }

    /// Expand `declaration` under `strategy` into one dispatchable descriptor.
    pub fn expand(
        &self,
        declaration: &EndpointDeclaration,
        strategy: Strategy,
        policy: &VersionPolicy,
    ) -> RoutingResult<RouteDescriptor> {
        let handler = declaration.handler();
        let parts = self.sub_descriptors(declaration, strategy, policy)?;
        let descriptor = self
            .combiner
            .reduce(parts)?
            .ok_or_else(|| RoutingError::invalid(handler, "expansion produced no routes"))?;

        for path in descriptor.paths() {
            PathTemplate::parse(path).map_err(|reason| RoutingError::invalid(handler, reason))?;
        }
        Ok(descriptor)
    }

    /// Pre-merge expansion: one descriptor for Path strategy and unversioned
    /// declarations, one per distinct version for Header and Query.
    pub fn sub_descriptors(
        &self,
        declaration: &EndpointDeclaration,
        strategy: Strategy,
        policy: &VersionPolicy,
    ) -> RoutingResult<Vec<RouteDescriptor>> {
        check_declaration(declaration)?;

        let base = RouteDescriptor::from_declaration(declaration);
        if !declaration.is_versioned() {
            return Ok(vec![base]);
        }

        let versions = declaration.versions();
        let parts = match strategy {
            Strategy::Path => {
                let mut paths = IndexSet::with_capacity(declaration.paths().len() * versions.len());
                for path in declaration.paths() {
                    for version in versions {
                        paths.insert(policy.versioned_path(*version, path));
                    }
                }
                vec![base.with_paths(paths)]
            }
            Strategy::Header => versions
                .iter()
                .map(|v| base.clone().with_header_condition(policy.header_name(), v.to_string()))
                .collect(),
            Strategy::Query => versions
                .iter()
                .map(|v| base.clone().with_query_condition(policy.query_param(), v.to_string()))
                .collect(),
        };

        Ok(parts)
    }
}

fn check_declaration(declaration: &EndpointDeclaration) -> RoutingResult<()> {
    let handler = declaration.handler();
    if declaration.paths().is_empty() {
        return Err(RoutingError::invalid(handler, "no path patterns declared"));
    }
    if let Some(path) = declaration.paths().iter().find(|p| !p.starts_with('/')) {
        return Err(RoutingError::invalid(
            handler,
            format!("path pattern {path:?} must start with '/'"),
        ));
    }
    if declaration.versions().contains(&0) {
        return Err(RoutingError::invalid(handler, "API versions must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::descriptor::{MethodSet, PassThrough, RequestMethod};

    fn users(versions: &[u32]) -> EndpointDeclaration {
        EndpointDeclaration::new("UserController.getUsers")
            .with_methods([RequestMethod::Get])
            .with_path("/users")
            .with_versions(versions.iter().copied())
    }

    fn paths(desc: &RouteDescriptor) -> Vec<&str> {
        desc.paths().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_path_expansion() {
        let desc = RouteExpander::new()
            .expand(&users(&[1, 2]), Strategy::Path, &VersionPolicy::default())
            .unwrap();

        assert_eq!(paths(&desc), vec!["/api/v1/users", "/api/v2/users"]);
        assert_eq!(desc.methods(), &[RequestMethod::Get].into_iter().collect::<MethodSet>());
        assert!(desc.header_conditions().is_empty());
        assert!(desc.query_conditions().is_empty());
    }

    #[test]
    fn test_path_expansion_multiple_patterns() {
        let decl = EndpointDeclaration::new("UserController.getUsers")
            .with_paths(["/users", "/people"])
            .with_versions([3, 1]);
        let desc = RouteExpander::new()
            .expand(&decl, Strategy::Path, &VersionPolicy::default())
            .unwrap();

        assert_eq!(
            paths(&desc),
            vec!["/api/v3/users", "/api/v1/users", "/api/v3/people", "/api/v1/people"]
        );
    }

    #[test]
    fn test_header_expansion_keeps_paths() {
        let decl = EndpointDeclaration::new("OrderController.list")
            .with_methods([RequestMethod::Get])
            .with_path("/orders")
            .with_versions([1, 3]);
        let desc = RouteExpander::new()
            .expand(&decl, Strategy::Header, &VersionPolicy::default())
            .unwrap();

        assert_eq!(paths(&desc), vec!["/orders"]);
        let values: Vec<&str> = desc
            .header_values("X-API-Version")
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(values, vec!["1", "3"]);
        assert!(desc.query_conditions().is_empty());
    }

    #[test]
    fn test_query_expansion_uses_configured_param() {
        let policy = VersionPolicy {
            query_param: "api".into(),
            ..VersionPolicy::default()
        };
        let desc = RouteExpander::new()
            .expand(&users(&[2]), Strategy::Query, &policy)
            .unwrap();

        assert_eq!(paths(&desc), vec!["/users"]);
        assert!(desc.query_conditions().get("api").unwrap().contains("2"));
        assert!(desc.header_conditions().is_empty());
    }

    #[test]
    fn test_duplicate_versions_collapse() {
        let expander = RouteExpander::new();
        let policy = VersionPolicy::default();
        for strategy in [Strategy::Path, Strategy::Header, Strategy::Query] {
            let dup = expander.expand(&users(&[2, 2, 1]), strategy, &policy).unwrap();
            let plain = expander.expand(&users(&[1, 2]), strategy, &policy).unwrap();
            assert_eq!(dup, plain, "strategy {strategy}");
        }

        let parts = expander
            .sub_descriptors(&users(&[5, 5, 5]), Strategy::Header, &policy)
            .unwrap();
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_sub_descriptors_first_seen_order() {
        let parts = RouteExpander::new()
            .sub_descriptors(&users(&[2, 2, 1]), Strategy::Query, &VersionPolicy::default())
            .unwrap();
        let values: Vec<&str> = parts
            .iter()
            .map(|p| p.query_conditions().get("version").unwrap()[0].as_str())
            .collect();
        assert_eq!(values, vec!["2", "1"]);
    }

    #[test]
    fn test_unversioned_passthrough() {
        let decl = EndpointDeclaration::new("UserController.test")
            .with_methods([RequestMethod::Get])
            .with_path("/users/test")
            .with_pass_through(PassThrough {
                produces: vec!["application/json".into()],
                ..PassThrough::default()
            });
        let expander = RouteExpander::new();
        for strategy in [Strategy::Path, Strategy::Header, Strategy::Query] {
            let desc = expander.expand(&decl, strategy, &VersionPolicy::default()).unwrap();
            assert_eq!(desc, RouteDescriptor::from_declaration(&decl));
        }
    }

    #[test]
    fn test_pass_through_preserved() {
        let pass = PassThrough {
            consumes: vec!["application/json".into()],
            params: vec!["debug".into()],
            ..PassThrough::default()
        };
        let decl = users(&[1]).with_pass_through(pass.clone());
        let desc = RouteExpander::new()
            .expand(&decl, Strategy::Header, &VersionPolicy::default())
            .unwrap();
        assert_eq!(desc.pass_through(), &pass);
    }

    #[test]
    fn test_no_paths_is_invalid() {
        let decl = EndpointDeclaration::new("Broken.handler").with_versions([1]);
        let err = RouteExpander::new()
            .expand(&decl, Strategy::Path, &VersionPolicy::default())
            .unwrap_err();
        assert!(matches!(err, RoutingError::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_malformed_template_is_invalid() {
        let decl = EndpointDeclaration::new("UserController.getUser")
            .with_methods([RequestMethod::Get])
            .with_path("/users/{id")
            .with_versions([1]);
        let expander = RouteExpander::new();
        for strategy in [Strategy::Path, Strategy::Header, Strategy::Query] {
            let err = expander
                .expand(&decl, strategy, &VersionPolicy::default())
                .unwrap_err();
            assert!(matches!(err, RoutingError::InvalidDeclaration { .. }), "strategy {strategy}");
        }
    }

    #[test]
    fn test_zero_version_is_invalid() {
        let err = RouteExpander::new()
            .expand(&users(&[0]), Strategy::Path, &VersionPolicy::default())
            .unwrap_err();
        assert!(matches!(err, RoutingError::InvalidDeclaration { .. }));
    }

    /// Keeps only the first per-version descriptor.
    #[derive(Debug)]
    struct FirstOnly;

    impl RouteCombiner for FirstOnly {
        fn combine(
            &self,
            acc: RouteDescriptor,
            _next: RouteDescriptor,
        ) -> RoutingResult<RouteDescriptor> {
            Ok(acc)
        }
    }

    #[test]
    fn test_custom_combiner() {
        let desc = RouteExpander::with_combiner(FirstOnly)
            .expand(&users(&[3, 1]), Strategy::Header, &VersionPolicy::default())
            .unwrap();
        let values: Vec<&str> = desc
            .header_values("X-API-Version")
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(values, vec!["3"]);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let expander = RouteExpander::new();
        let policy = VersionPolicy::default();
        let decl = users(&[1, 4]);
        for strategy in [Strategy::Path, Strategy::Header, Strategy::Query] {
            let first = expander.expand(&decl, strategy, &policy).unwrap();
            let second = expander.expand(&decl, strategy, &policy).unwrap();
            assert_eq!(first, second);
        }
    }
}
