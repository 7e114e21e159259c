//! Route shapes before and after version expansion.
//!
//! # Responsibilities
//! - `EndpointDeclaration`: the declared, pre-expansion shape of one handler
//! - `RouteDescriptor`: a concrete entry ready for the dispatch table
//! - Method sets, condition sets and opaque pass-through conditions
//!
//! # Design Decisions
//! - Both types are immutable once built (private fields, accessors only)
//! - Ordered sets are `IndexSet`: deduplicated, first-seen order kept
//! - Equality of sets ignores order, so re-expansion compares structurally
//! - An empty method set means "any method"

use axum::http::Method;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::versioning::StrategyOverride;

/// HTTP method tokens accepted in declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Head => "HEAD",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Options => "OPTIONS",
            RequestMethod::Trace => "TRACE",
        }
    }

    pub fn to_http(self) -> Method {
        match self {
            RequestMethod::Get => Method::GET,
            RequestMethod::Head => Method::HEAD,
            RequestMethod::Post => Method::POST,
            RequestMethod::Put => Method::PUT,
            RequestMethod::Patch => Method::PATCH,
            RequestMethod::Delete => Method::DELETE,
            RequestMethod::Options => Method::OPTIONS,
            RequestMethod::Trace => Method::TRACE,
        }
    }

    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(RequestMethod::Get),
            Method::HEAD => Some(RequestMethod::Head),
            Method::POST => Some(RequestMethod::Post),
            Method::PUT => Some(RequestMethod::Put),
            Method::PATCH => Some(RequestMethod::Patch),
            Method::DELETE => Some(RequestMethod::Delete),
            Method::OPTIONS => Some(RequestMethod::Options),
            Method::TRACE => Some(RequestMethod::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of methods a route answers to. Empty = any method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MethodSet(IndexSet<RequestMethod>);

impl MethodSet {
    /// A set matching every method.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestMethod> {
        self.0.iter()
    }

    /// Two sets intersect if they share a method or either one is "any".
    pub fn intersects(&self, other: &MethodSet) -> bool {
        if self.is_any() || other.is_any() {
            return true;
        }
        self.0.iter().any(|m| other.0.contains(m))
    }

    /// Whether `method` is listed explicitly. "Any" declares nothing.
    pub fn declares(&self, method: &Method) -> bool {
        RequestMethod::from_http(method).is_some_and(|m| self.0.contains(&m))
    }

    /// Whether a request with `method` is served. GET routes also answer HEAD.
    pub fn allows(&self, method: &Method) -> bool {
        if self.is_any() {
            return true;
        }
        match RequestMethod::from_http(method) {
            Some(RequestMethod::Head) => {
                self.0.contains(&RequestMethod::Head) || self.0.contains(&RequestMethod::Get)
            }
            Some(m) => self.0.contains(&m),
            None => false,
        }
    }
}

impl FromIterator<RequestMethod> for MethodSet {
    fn from_iter<I: IntoIterator<Item = RequestMethod>>(methods: I) -> Self {
        Self(methods.into_iter().collect())
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("[*]");
        }
        let names: Vec<&str> = self.0.iter().map(RequestMethod::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Identity of the handler that owns a route, e.g. `UserController.getUsers`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct HandlerId(String);

impl HandlerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Name → accepted values. OR across the values of one name, AND across names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ConditionSet(IndexMap<String, IndexSet<String>>);

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Add `value` to the accepted values for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().insert(value.into());
    }

    pub fn get(&self, name: &str) -> Option<&IndexSet<String>> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Union `other` into `self`, value sets merged per name.
    pub fn union(&mut self, other: &ConditionSet) {
        for (name, values) in &other.0 {
            let entry = self.0.entry(name.clone()).or_default();
            entry.extend(values.iter().cloned());
        }
    }

    /// True when no request can satisfy both sets: some name is constrained
    /// by both with no value in common.
    pub fn excludes(&self, other: &ConditionSet) -> bool {
        self.0.iter().any(|(name, values)| match other.0.get(name) {
            Some(theirs) => values.is_disjoint(theirs),
            None => false,
        })
    }
}

/// Conditions carried through expansion untouched.
///
/// Expressions follow the usual mapping syntax: `name`, `!name`,
/// `name=value`, `name!=value` for params and headers; media types for
/// `consumes` and `produces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PassThrough {
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub params: Vec<String>,
    pub headers: Vec<String>,
}

impl PassThrough {
    pub fn is_empty(&self) -> bool {
        self.consumes.is_empty()
            && self.produces.is_empty()
            && self.params.is_empty()
            && self.headers.is_empty()
    }
}

/// Declared, pre-expansion shape of one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDeclaration {
    handler: HandlerId,
    methods: MethodSet,
    paths: IndexSet<String>,
    versions: IndexSet<u32>,
    strategy: StrategyOverride,
    pass_through: PassThrough,
}

impl EndpointDeclaration {
    /// Start a declaration for `handler`: any method, no paths, unversioned.
    pub fn new(handler: impl Into<HandlerId>) -> Self {
        Self {
            handler: handler.into(),
            methods: MethodSet::any(),
            paths: IndexSet::new(),
            versions: IndexSet::new(),
            strategy: StrategyOverride::Inherit,
            pass_through: PassThrough::default(),
        }
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = RequestMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.insert(path.into());
        self
    }

    pub fn with_paths<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Duplicate versions collapse; first-seen order is kept.
    pub fn with_versions(mut self, versions: impl IntoIterator<Item = u32>) -> Self {
        self.versions.extend(versions);
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyOverride) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_pass_through(mut self, pass_through: PassThrough) -> Self {
        self.pass_through = pass_through;
        self
    }

    pub fn handler(&self) -> &HandlerId {
        &self.handler
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn paths(&self) -> &IndexSet<String> {
        &self.paths
    }

    pub fn versions(&self) -> &IndexSet<u32> {
        &self.versions
    }

    pub fn is_versioned(&self) -> bool {
        !self.versions.is_empty()
    }

    pub fn strategy(&self) -> StrategyOverride {
        self.strategy
    }

    pub fn pass_through(&self) -> &PassThrough {
        &self.pass_through
    }
}

/// Concrete route handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    handler: HandlerId,
    methods: MethodSet,
    paths: IndexSet<String>,
    header_conditions: ConditionSet,
    query_conditions: ConditionSet,
    #[serde(skip_serializing_if = "PassThrough::is_empty")]
    pass_through: PassThrough,
}

impl RouteDescriptor {
    /// Copy the declaration's shape as-is, without version conditions.
    pub fn from_declaration(declaration: &EndpointDeclaration) -> Self {
        Self {
            handler: declaration.handler.clone(),
            methods: declaration.methods.clone(),
            paths: declaration.paths.clone(),
            header_conditions: ConditionSet::new(),
            query_conditions: ConditionSet::new(),
            pass_through: declaration.pass_through.clone(),
        }
    }

    pub fn with_paths(mut self, paths: IndexSet<String>) -> Self {
        self.paths = paths;
        self
    }

    /// Header names are case-insensitive and stored lower-cased.
    pub fn with_header_condition(mut self, name: &str, value: impl Into<String>) -> Self {
        self.header_conditions.insert(name.to_ascii_lowercase(), value);
        self
    }

    pub fn with_query_condition(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_conditions.insert(name, value);
        self
    }

    pub(crate) fn merge_conditions(&mut self, other: &RouteDescriptor) {
        self.header_conditions.union(&other.header_conditions);
        self.query_conditions.union(&other.query_conditions);
    }

    /// Same handler, methods, paths and pass-through conditions.
    pub fn same_shape(&self, other: &RouteDescriptor) -> bool {
        self.handler == other.handler
            && self.methods == other.methods
            && self.paths == other.paths
            && self.pass_through == other.pass_through
    }

    pub fn handler(&self) -> &HandlerId {
        &self.handler
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn paths(&self) -> &IndexSet<String> {
        &self.paths
    }

    pub fn header_conditions(&self) -> &ConditionSet {
        &self.header_conditions
    }

    /// Accepted values for header `name`, looked up case-insensitively.
    pub fn header_values(&self, name: &str) -> Option<&IndexSet<String>> {
        self.header_conditions.get(&name.to_ascii_lowercase())
    }

    pub fn query_conditions(&self) -> &ConditionSet {
        &self.query_conditions
    }

    pub fn pass_through(&self) -> &PassThrough {
        &self.pass_through
    }

    /// Number of version-condition names; higher = more specific.
    pub fn specificity(&self) -> usize {
        self.header_conditions.len() + self.query_conditions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_set_intersection() {
        let get = [RequestMethod::Get].into_iter().collect::<MethodSet>();
        let post = [RequestMethod::Post].into_iter().collect::<MethodSet>();
        let both = [RequestMethod::Get, RequestMethod::Post].into_iter().collect::<MethodSet>();

        assert!(get.intersects(&both));
        assert!(!get.intersects(&post));
        assert!(MethodSet::any().intersects(&post));
    }

    #[test]
    fn test_method_set_allows_head_for_get() {
        let get = [RequestMethod::Get].into_iter().collect::<MethodSet>();
        assert!(get.allows(&Method::GET));
        assert!(get.allows(&Method::HEAD));
        assert!(!get.allows(&Method::POST));
        assert!(MethodSet::any().allows(&Method::DELETE));
    }

    #[test]
    fn test_method_set_declares_only_listed_methods() {
        let get = [RequestMethod::Get].into_iter().collect::<MethodSet>();
        assert!(get.declares(&Method::GET));
        assert!(!get.declares(&Method::HEAD));
        assert!(!MethodSet::any().declares(&Method::GET));
    }

    #[test]
    fn test_declaration_dedupes_paths_and_versions() {
        let decl = EndpointDeclaration::new("UserController.getUsers")
            .with_paths(["/users", "/people", "/users"])
            .with_versions([2, 2, 1]);

        let paths: Vec<&str> = decl.paths().iter().map(String::as_str).collect();
        assert_eq!(paths, vec!["/users", "/people"]);
        let versions: Vec<u32> = decl.versions().iter().copied().collect();
        assert_eq!(versions, vec![2, 1]);
    }

    #[test]
    fn test_condition_exclusion() {
        let mut v1 = ConditionSet::new();
        v1.insert("x-api-version", "1");
        let mut v2 = ConditionSet::new();
        v2.insert("x-api-version", "2");
        let mut v1_or_3 = ConditionSet::new();
        v1_or_3.insert("x-api-version", "1");
        v1_or_3.insert("x-api-version", "3");

        assert!(v1.excludes(&v2));
        assert!(!v1.excludes(&v1_or_3));
        assert!(!v1.excludes(&ConditionSet::new()));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let decl = EndpointDeclaration::new("A.b").with_path("/orders");
        let desc =
            RouteDescriptor::from_declaration(&decl).with_header_condition("X-API-Version", "1");
        assert!(desc.header_values("x-api-version").is_some());
        assert!(desc.header_values("X-Api-Version").is_some());
    }
}
