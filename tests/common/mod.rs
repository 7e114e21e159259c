//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use api_versioning::config::{parse_config, AppConfig};
use api_versioning::http::{echo, HandlerRegistry, HttpServer};
use api_versioning::lifecycle::{build_route_table, Shutdown};
use api_versioning::RouteTable;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// The user controller manifest: path-versioned list, a header-versioned
/// overload and an unversioned sibling under the class version.
pub const USERS: &str = r#"
    [apiversioning]
    strategy = "PATH"
    headerName = "X-API-Version"
    queryParam = "version"
    basePath = "/api"

    [[controllers]]
    name = "UserController"
    paths = ["/users"]
    api_version = { values = [1] }

    [[controllers.endpoints]]
    name = "getUsers"
    methods = ["GET"]
    api_version = { values = [4, 2] }

    [[controllers.endpoints]]
    name = "getUsersV3"
    methods = ["GET"]
    api_version = { values = [1], strategy = "HEADER" }

    [[controllers.endpoints]]
    name = "getUsersV4"
    methods = ["GET"]
    paths = ["/test"]

    [[controllers.endpoints]]
    name = "getUser"
    methods = ["GET", "PUT"]
    paths = ["/{id}"]
    api_version = { values = [2] }

    [[controllers]]
    name = "OrderController"
    paths = ["/orders"]

    [[controllers.endpoints]]
    name = "list"
    methods = ["GET"]
    api_version = { values = [1, 2], strategy = "QUERY" }

    [[controllers.endpoints]]
    name = "create"
    methods = ["POST"]
    consumes = ["application/json"]
"#;

pub fn config(text: &str) -> AppConfig {
    parse_config(text).unwrap()
}

pub fn table(text: &str) -> RouteTable {
    build_route_table(&config(text)).unwrap()
}

/// Server answering every route with the echo handler.
pub fn echo_server(config: &AppConfig, table: &RouteTable) -> HttpServer {
    let registry = HandlerRegistry::new().with_fallback(echo);
    HttpServer::new(config.listener.clone(), table, registry).unwrap()
}

/// Bind an ephemeral port and serve `server` until `shutdown` fires.
pub async fn spawn_server(
    server: HttpServer,
    updates: mpsc::UnboundedReceiver<RouteTable>,
    shutdown: &Shutdown,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, updates, rx).await;
    });
    addr
}
