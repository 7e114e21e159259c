//! Global versioning policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an API version is conveyed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    /// `/api/v1/users`
    #[default]
    #[serde(alias = "path")]
    Path,
    /// `X-API-Version: 1`
    #[serde(alias = "header")]
    Header,
    /// `?version=1`
    #[serde(alias = "query")]
    Query,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Path => write!(f, "PATH"),
            Strategy::Header => write!(f, "HEADER"),
            Strategy::Query => write!(f, "QUERY"),
        }
    }
}

/// Process-wide versioning defaults (`[apiversioning]`).
///
/// Loaded once before route-table construction and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VersionPolicy {
    /// Strategy used by endpoints that do not override it.
    pub strategy: Strategy,

    /// Header carrying the version under the Header strategy.
    #[serde(alias = "headerName")]
    pub header_name: String,

    /// Query parameter carrying the version under the Query strategy.
    #[serde(alias = "queryParam")]
    pub query_param: String,

    /// Prefix placed before `/v{N}`. Only applies to the Path strategy.
    #[serde(alias = "basePath")]
    pub base_path: String,
}

impl Default for VersionPolicy {
    fn default() -> Self {
        Self {
            strategy: Strategy::Path,
            header_name: "X-API-Version".to_string(),
            query_param: "version".to_string(),
            base_path: "/api".to_string(),
        }
    }
}

impl VersionPolicy {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn query_param(&self) -> &str {
        &self.query_param
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Path-strategy rewrite: `{base_path}/v{version}{path}`.
    pub fn versioned_path(&self, version: u32, path: &str) -> String {
        format!("{}/v{}{}", self.base_path, version, path)
    }
}
