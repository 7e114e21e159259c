//! Endpoint manifest and declaration extraction.
//!
//! # Responsibilities
//! - Describe controllers and their endpoints in config
//! - Merge class-level and method-level version declarations
//! - Produce `EndpointDeclaration`s in manifest order
//!
//! # Design Decisions
//! - A method-level `api_version` replaces the class-level one as a whole
//!   (values and strategy together); neither present = unversioned
//! - Paths are class paths × method paths, concatenated; empty = `/`
//! - Handler identity is `Controller.endpoint`

use serde::{Deserialize, Serialize};

use crate::routing::{EndpointDeclaration, PassThrough, RequestMethod};
use crate::versioning::StrategyOverride;

/// A version declaration on a controller or endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiVersionConfig {
    /// Declared versions, e.g. `[4, 2]`.
    pub values: Vec<u32>,

    /// `DEFAULT`/`INHERIT` falls back to the global policy.
    #[serde(default)]
    pub strategy: StrategyOverride,
}

/// A group of endpoints sharing a path prefix and version declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    pub name: String,

    /// Class-level path prefixes.
    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default)]
    pub api_version: Option<ApiVersionConfig>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

/// One handler method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub name: String,

    /// Empty = any method.
    #[serde(default)]
    pub methods: Vec<RequestMethod>,

    /// Method-level paths, appended to each controller path.
    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default)]
    pub api_version: Option<ApiVersionConfig>,

    #[serde(flatten)]
    pub pass_through: PassThrough,
}

impl ControllerConfig {
    pub fn handler_id(&self, endpoint: &EndpointConfig) -> String {
        format!("{}.{}", self.name, endpoint.name)
    }
}

fn combine_paths(prefixes: &[String], suffixes: &[String]) -> Vec<String> {
    let empty = [String::new()];
    let prefixes = if prefixes.is_empty() { &empty[..] } else { prefixes };
    let suffixes = if suffixes.is_empty() { &empty[..] } else { suffixes };

    let mut paths = Vec::with_capacity(prefixes.len() * suffixes.len());
    for prefix in prefixes {
        for suffix in suffixes {
            let joined = format!("{prefix}{suffix}");
            paths.push(if joined.is_empty() { "/".to_string() } else { joined });
        }
    }
    paths
}

/// Flatten the manifest into declarations, in manifest order.
pub fn extract_declarations(controllers: &[ControllerConfig]) -> Vec<EndpointDeclaration> {
    let mut declarations = Vec::new();

    for controller in controllers {
        for endpoint in &controller.endpoints {
            let mut declaration = EndpointDeclaration::new(controller.handler_id(endpoint))
                .with_methods(endpoint.methods.iter().copied())
                .with_paths(combine_paths(&controller.paths, &endpoint.paths))
                .with_pass_through(endpoint.pass_through.clone());

            let version = endpoint
                .api_version
                .as_ref()
                .or(controller.api_version.as_ref());
            if let Some(version) = version {
                declaration = declaration
                    .with_versions(version.values.iter().copied())
                    .with_strategy(version.strategy);
            }

            declarations.push(declaration);
        }
    }

    declarations
}
