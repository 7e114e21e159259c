//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: one fallback serving the route snapshot
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Swap in rebuilt route tables while serving

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::http::dispatch::{self, HandlerRegistry, RouteSnapshot};
use crate::http::request::UuidRequestId;
use crate::routing::{RouteTable, RoutingResult};

/// HTTP server for the versioned API.
pub struct HttpServer {
    router: Router,
    snapshot: Arc<ArcSwap<RouteSnapshot>>,
    registry: HandlerRegistry,
}

impl HttpServer {
    /// Compile `table` against `registry` and build the router.
    pub fn new(
        config: ListenerConfig,
        table: &RouteTable,
        registry: HandlerRegistry,
    ) -> RoutingResult<Self> {
        let snapshot = Arc::new(ArcSwap::from_pointee(RouteSnapshot::empty()));
        dispatch::publish(&snapshot, &registry, table)?;
        let router = Self::build_router(&config, snapshot.clone());
        Ok(Self {
            router,
            snapshot,
            registry,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, snapshot: Arc<ArcSwap<RouteSnapshot>>) -> Router {
        Router::new()
            .fallback(dispatch::dispatch)
            .with_state(snapshot)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The router, for in-process use (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Compile and atomically publish a new route table.
    ///
    /// On error the current snapshot keeps serving.
    pub fn publish(&self, table: &RouteTable) -> RoutingResult<()> {
        dispatch::publish(&self.snapshot, &self.registry, table)
    }

    /// Number of routes currently served.
    pub fn route_count(&self) -> usize {
        self.snapshot.load().len()
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Route tables arriving on `updates` replace the served snapshot.
    pub async fn run(
        self,
        listener: TcpListener,
        mut updates: mpsc::UnboundedReceiver<RouteTable>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.route_count(), "HTTP server starting");

        let snapshot = self.snapshot.clone();
        let registry = self.registry.clone();
        tokio::spawn(async move {
            while let Some(table) = updates.recv().await {
                if let Err(e) = dispatch::publish(&snapshot, &registry, &table) {
                    tracing::error!(error = %e, "Rejected reloaded route table, keeping current");
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
