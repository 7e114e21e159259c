//! Effective strategy resolution.
//!
//! # Responsibilities
//! - Map an endpoint's declared override onto the global policy
//!
//! # Design Decisions
//! - Total over the enum domain, cannot fail
//! - Class-level vs method-level merging happens before this point
//!   (see `config::manifest`)

use serde::{Deserialize, Serialize};

use crate::versioning::policy::{Strategy, VersionPolicy};

/// Strategy declared on a single endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyOverride {
    /// Use whatever the global policy says.
    #[default]
    #[serde(alias = "DEFAULT", alias = "inherit", alias = "default")]
    Inherit,
    #[serde(alias = "path")]
    Path,
    #[serde(alias = "header")]
    Header,
    #[serde(alias = "query")]
    Query,
}

/// Resolves per-endpoint overrides against the global policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyResolver;

impl StrategyResolver {
    pub fn new() -> Self {
        Self
    }

    /// `Inherit` yields the policy strategy, anything else is returned verbatim.
    pub fn resolve(&self, override_: StrategyOverride, policy: &VersionPolicy) -> Strategy {
        match override_ {
            StrategyOverride::Inherit => policy.strategy(),
            StrategyOverride::Path => Strategy::Path,
            StrategyOverride::Header => Strategy::Header,
            StrategyOverride::Query => Strategy::Query,
        }
    }
}
