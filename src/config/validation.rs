//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic, including unknown strategies)
//! - Validate versioning policy values (header token, query param, base path)
//! - Validate the endpoint manifest (names, paths, version numbers)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Route conflicts are left to the route table, which sees expanded paths

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::versioning::VersionPolicy;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("apiversioning.header_name {0:?} is not a valid header name")]
    InvalidHeaderName(String),

    #[error("apiversioning.query_param {0:?} is not a usable query parameter name")]
    InvalidQueryParam(String),

    #[error("apiversioning.base_path {0:?} must be empty or start with '/' and not end with '/'")]
    InvalidBasePath(String),

    #[error("controller #{0} has an empty name")]
    EmptyControllerName(usize),

    #[error("controller {0} has an endpoint with an empty name")]
    EmptyEndpointName(String),

    #[error("handler {0} is declared more than once")]
    DuplicateHandler(String),

    #[error("{owner}: path {path:?} must be empty or start with '/'")]
    InvalidPath { owner: String, path: String },

    #[error("{owner}: API version {version} must be >= 1")]
    InvalidVersion { owner: String, version: u32 },
}

fn validate_policy(policy: &VersionPolicy, errors: &mut Vec<ValidationError>) {
    if HeaderName::from_bytes(policy.header_name.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName(policy.header_name.clone()));
    }

    let param = &policy.query_param;
    if param.is_empty()
        || param
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '&' | '=' | '?' | '#'))
    {
        errors.push(ValidationError::InvalidQueryParam(param.clone()));
    }

    let base = &policy.base_path;
    if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
        errors.push(ValidationError::InvalidBasePath(base.clone()));
    }
}

fn check_paths(owner: &str, paths: &[String], errors: &mut Vec<ValidationError>) {
    for path in paths {
        if !path.is_empty() && !path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                owner: owner.to_string(),
                path: path.clone(),
            });
        }
    }
}

fn check_versions(owner: &str, values: &[u32], errors: &mut Vec<ValidationError>) {
    for &version in values {
        if version == 0 {
            errors.push(ValidationError::InvalidVersion {
                owner: owner.to_string(),
                version,
            });
        }
    }
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    validate_policy(&config.apiversioning, &mut errors);

    let mut handlers = HashSet::new();
    for (i, controller) in config.controllers.iter().enumerate() {
        if controller.name.trim().is_empty() {
            errors.push(ValidationError::EmptyControllerName(i));
        }
        check_paths(&controller.name, &controller.paths, &mut errors);
        if let Some(version) = &controller.api_version {
            check_versions(&controller.name, &version.values, &mut errors);
        }

        for endpoint in &controller.endpoints {
            if endpoint.name.trim().is_empty() {
                errors.push(ValidationError::EmptyEndpointName(controller.name.clone()));
                continue;
            }
            let handler = controller.handler_id(endpoint);
            check_paths(&handler, &endpoint.paths, &mut errors);
            if let Some(version) = &endpoint.api_version {
                check_versions(&handler, &version.values, &mut errors);
            }
            if !handlers.insert(handler.clone()) {
                errors.push(ValidationError::DuplicateHandler(handler));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> AppConfig {
        toml::from_str(doc).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_policy_errors_are_all_reported() {
        let config = parse(
            r#"
            [apiversioning]
            header_name = "Bad Header"
            query_param = "a=b"
            base_path = "api/"
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::InvalidHeaderName(_)));
        assert!(matches!(errors[1], ValidationError::InvalidQueryParam(_)));
        assert!(matches!(errors[2], ValidationError::InvalidBasePath(_)));
    }

    #[test]
    fn test_empty_base_path_allowed() {
        let config = parse(
            r#"
            [apiversioning]
            base_path = ""
            "#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_manifest_errors() {
        let config = parse(
            r#"
            [[controllers]]
            name = "UserController"
            paths = ["users"]

            [[controllers.endpoints]]
            name = "list"
            api_version = { values = [0, 1] }

            [[controllers.endpoints]]
            name = "list"
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidPath {
            owner: "UserController".into(),
            path: "users".into(),
        }));
        assert!(errors.contains(&ValidationError::InvalidVersion {
            owner: "UserController.list".into(),
            version: 0,
        }));
        assert!(errors.contains(&ValidationError::DuplicateHandler("UserController.list".into())));
    }

    #[test]
    fn test_bad_bind_address() {
        let config = parse(
            r#"
            [listener]
            bind_address = "localhost"
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidBindAddress("localhost".into())]);
    }
}
