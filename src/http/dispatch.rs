//! Request dispatch over a compiled route snapshot.
//!
//! # Responsibilities
//! - Compile a `RouteTable` plus handlers into an immutable `RouteSnapshot`
//! - Select the route for a request: path → method → version → pass-through
//! - Invoke the owning handler, or answer 404/405
//!
//! # Design Decisions
//! - The served snapshot sits behind `ArcSwap`; reloads publish a new one
//!   atomically, in-flight requests keep the one they loaded
//! - Among matching routes the most specific wins: more version-condition
//!   names first, then an explicitly declared method over GET-answers-HEAD
//!   or any-method, then more literal path segments, then table order
//! - Path + method matched but no version condition matched = 404

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::{BoxFuture, FutureExt};
use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use crate::http::request::request_id;
use crate::observability::metrics;
use crate::routing::matcher::{AndMatcher, Matcher, MethodMatcher, PathTemplate};
use crate::routing::{
    HandlerId, RequestMethod, RouteDescriptor, RouteTable, RoutingError, RoutingResult,
};

pub type HandlerFuture = BoxFuture<'static, Response>;

/// Type-erased async handler.
pub type BoxedHandler = Arc<dyn Fn(Request<Body>) -> HandlerFuture + Send + Sync>;

fn boxed<F, Fut, R>(handler: F) -> BoxedHandler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req| {
        let fut = handler(req);
        async move { fut.await.into_response() }.boxed()
    })
}

/// Handler implementations keyed by handler identity.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, BoxedHandler>,
    fallback: Option<BoxedHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `id`, replacing any previous one.
    pub fn register<F, Fut, R>(&mut self, id: impl Into<HandlerId>, handler: F) -> &mut Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handlers.insert(id.into(), boxed(handler));
        self
    }

    /// Handler used for any id without an explicit registration.
    pub fn with_fallback<F, Fut, R>(mut self, handler: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.fallback = Some(boxed(handler));
        self
    }

    pub fn resolve(&self, id: &HandlerId) -> Option<BoxedHandler> {
        self.handlers.get(id).or(self.fallback.as_ref()).cloned()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Inserted into request extensions before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute {
    pub handler: HandlerId,
    /// The path pattern that matched, e.g. `/api/v1/users/{id}`.
    pub pattern: String,
    pub params: IndexMap<String, String>,
}

struct CompiledRoute {
    descriptor: RouteDescriptor,
    templates: Vec<PathTemplate>,
    method: MethodMatcher,
    versions: AndMatcher,
    pass_through: AndMatcher,
    handler: BoxedHandler,
}

/// Result of route selection.
pub enum Selection {
    Matched(BoxedHandler, MatchedRoute),
    NoPath,
    MethodNotAllowed(Vec<RequestMethod>),
    NoVersion,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Matched(_, matched) => f.debug_tuple("Matched").field(matched).finish(),
            Selection::NoPath => f.write_str("NoPath"),
            Selection::MethodNotAllowed(allow) => {
                f.debug_tuple("MethodNotAllowed").field(allow).finish()
            }
            Selection::NoVersion => f.write_str("NoVersion"),
        }
    }
}

/// Immutable, dispatch-ready view of a route table.
#[derive(Default)]
pub struct RouteSnapshot {
    routes: Vec<CompiledRoute>,
}

impl std::fmt::Debug for RouteSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSnapshot")
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl RouteSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile every descriptor. Fails if a path template is malformed or a
    /// handler is missing from the registry.
    pub fn compile(table: &RouteTable, registry: &HandlerRegistry) -> RoutingResult<Self> {
        let mut routes = Vec::with_capacity(table.len());

        for descriptor in table {
            let handler_id = descriptor.handler();
            let templates = descriptor
                .paths()
                .iter()
                .map(|p| PathTemplate::parse(p))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|reason| RoutingError::invalid(handler_id, reason))?;
            let handler = registry
                .resolve(handler_id)
                .ok_or_else(|| RoutingError::invalid(handler_id, "no handler registered"))?;

            routes.push(CompiledRoute {
                descriptor: descriptor.clone(),
                templates,
                method: MethodMatcher::new(descriptor.methods().clone()),
                versions: AndMatcher::version_conditions(descriptor),
                pass_through: AndMatcher::pass_through(descriptor),
                handler,
            });
        }

        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Pick the route that should serve `req`.
    pub fn select(&self, req: &Request<Body>) -> Selection {
        let path = req.uri().path();
        let mut path_hit = false;
        let mut method_hit = false;
        let mut allowed: IndexSet<RequestMethod> = IndexSet::new();
        let mut best: Option<((usize, bool, usize), &CompiledRoute, MatchedRoute)> = None;

        for route in &self.routes {
            let Some((template, params)) = route
                .templates
                .iter()
                .find_map(|t| t.captures(path).map(|p| (t, p)))
            else {
                continue;
            };
            path_hit = true;

            if !route.method.matches(req) {
                allowed.extend(route.descriptor.methods().iter().copied());
                continue;
            }
            method_hit = true;

            if !route.versions.matches(req) || !route.pass_through.matches(req) {
                continue;
            }

            let rank = (
                route.descriptor.specificity(),
                route.descriptor.methods().declares(req.method()),
                template.literal_count(),
            );
            if best.as_ref().map_or(true, |(r, _, _)| rank > *r) {
                let matched = MatchedRoute {
                    handler: route.descriptor.handler().clone(),
                    pattern: template.pattern().to_string(),
                    params,
                };
                best = Some((rank, route, matched));
            }
        }

        match best {
            Some((_, route, matched)) => Selection::Matched(route.handler.clone(), matched),
            None if !path_hit => Selection::NoPath,
            None if !method_hit => Selection::MethodNotAllowed(allowed.into_iter().collect()),
            None => Selection::NoVersion,
        }
    }
}

/// Swap a freshly compiled snapshot into `current`.
pub fn publish(
    current: &ArcSwap<RouteSnapshot>,
    registry: &HandlerRegistry,
    table: &RouteTable,
) -> RoutingResult<()> {
    let snapshot = RouteSnapshot::compile(table, registry)?;
    let count = snapshot.len();
    current.store(Arc::new(snapshot));
    metrics::record_routes_registered(count);
    tracing::info!(routes = count, "Route snapshot published");
    Ok(())
}

/// Fallback handler serving every request from the current snapshot.
pub async fn dispatch(
    State(snapshot): State<Arc<ArcSwap<RouteSnapshot>>>,
    mut request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let snapshot = snapshot.load_full();
    match snapshot.select(&request) {
        Selection::Matched(handler, matched) => {
            let handler_id = matched.handler.clone();
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                handler = %handler_id,
                pattern = %matched.pattern,
                "Dispatching request"
            );
            request.extensions_mut().insert(matched);
            let response = handler(request).await;
            metrics::record_request(handler_id.as_str(), response.status().as_u16(), start);
            response
        }
        Selection::NoPath => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request("none", 404, start);
            (StatusCode::NOT_FOUND, "No matching route found").into_response()
        }
        Selection::MethodNotAllowed(allow) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "Method not allowed"
            );
            metrics::record_request("none", 405, start);
            let allow = allow
                .iter()
                .map(RequestMethod::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, allow)],
                "Method not allowed",
            )
                .into_response()
        }
        Selection::NoVersion => {
            tracing::warn!(
                request_id = %request_id,
                path = %path,
                "No route for requested API version"
            );
            metrics::record_request("none", 404, start);
            (StatusCode::NOT_FOUND, "No route for the requested API version").into_response()
        }
    }
}

/// Default handler: reports which route answered.
pub async fn echo(request: Request<Body>) -> Response {
    match request.extensions().get::<MatchedRoute>() {
        Some(matched) => Json(json!({
            "handler": matched.handler.as_str(),
            "pattern": matched.pattern,
            "params": matched.params,
        }))
        .into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::EndpointDeclaration;
    use crate::versioning::{StrategyOverride, VersionPolicy};

    fn table() -> RouteTable {
        let decls = vec![
            EndpointDeclaration::new("Users.list")
                .with_methods([RequestMethod::Get])
                .with_path("/users")
                .with_versions([1, 2]),
            EndpointDeclaration::new("Orders.v1")
                .with_methods([RequestMethod::Get])
                .with_path("/orders")
                .with_versions([1])
                .with_strategy(StrategyOverride::Header),
            EndpointDeclaration::new("Orders.plain")
                .with_methods([RequestMethod::Get])
                .with_path("/orders"),
            EndpointDeclaration::new("Users.get")
                .with_methods([RequestMethod::Get, RequestMethod::Put])
                .with_path("/users/{id}")
                .with_versions([1]),
        ];
        RouteTable::build(&decls, &VersionPolicy::default()).unwrap()
    }

    fn registry() -> HandlerRegistry {
        HandlerRegistry::new().with_fallback(|_req: Request<Body>| async { StatusCode::OK })
    }

    fn req(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn selected(selection: Selection) -> MatchedRoute {
        match selection {
            Selection::Matched(_, matched) => matched,
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_select_path_versioned() {
        let snapshot = RouteSnapshot::compile(&table(), &registry()).unwrap();
        let matched = selected(snapshot.select(&req("GET", "/api/v2/users")));
        assert_eq!(matched.handler.as_str(), "Users.list");
        assert_eq!(matched.pattern, "/api/v2/users");
    }

    #[test]
    fn test_select_captures_params() {
        let snapshot = RouteSnapshot::compile(&table(), &registry()).unwrap();
        let matched = selected(snapshot.select(&req("PUT", "/api/v1/users/7")));
        assert_eq!(matched.handler.as_str(), "Users.get");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_more_specific_wins() {
        let snapshot = RouteSnapshot::compile(&table(), &registry()).unwrap();

        let versioned = Request::builder()
            .uri("/orders")
            .header("X-API-Version", "1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(selected(snapshot.select(&versioned)).handler.as_str(), "Orders.v1");
        assert_eq!(
            selected(snapshot.select(&req("GET", "/orders"))).handler.as_str(),
            "Orders.plain"
        );
    }

    #[test]
    fn test_no_path_and_method_not_allowed() {
        let snapshot = RouteSnapshot::compile(&table(), &registry()).unwrap();
        assert!(matches!(snapshot.select(&req("GET", "/nope")), Selection::NoPath));
        match snapshot.select(&req("DELETE", "/api/v1/users/7")) {
            Selection::MethodNotAllowed(allow) => {
                assert_eq!(allow, vec![RequestMethod::Get, RequestMethod::Put]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_head_beats_implied_head() {
        let decls = vec![
            EndpointDeclaration::new("C.get")
                .with_methods([RequestMethod::Get])
                .with_path("/x"),
            EndpointDeclaration::new("C.head")
                .with_methods([RequestMethod::Head])
                .with_path("/x"),
        ];
        let table = RouteTable::build(&decls, &VersionPolicy::default()).unwrap();
        let snapshot = RouteSnapshot::compile(&table, &registry()).unwrap();

        assert_eq!(selected(snapshot.select(&req("HEAD", "/x"))).handler.as_str(), "C.head");
        assert_eq!(selected(snapshot.select(&req("GET", "/x"))).handler.as_str(), "C.get");
    }

    #[test]
    fn test_missing_handler_rejected() {
        let err = RouteSnapshot::compile(&table(), &HandlerRegistry::new()).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_publish_swaps_snapshot() {
        let current = ArcSwap::from_pointee(RouteSnapshot::empty());
        publish(&current, &registry(), &table()).unwrap();
        assert_eq!(current.load().len(), 4);
    }
}
