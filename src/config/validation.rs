//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require every device setting the reconciler needs
//! - Validate URL and endpoint syntax
//! - Detect duplicate static routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{BigIpConfig, BridgeConfig};
use crate::registry::{Endpoint, RouteUri};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid management url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("route '{uri}' has invalid endpoint '{endpoint}'")]
    InvalidEndpoint { uri: String, endpoint: String },

    #[error("route '{0}' is declared more than once")]
    DuplicateRoute(String),

    #[error("route uri must not be empty")]
    EmptyRoute,
}

/// Check the device settings the aggregator cannot run without.
pub fn validate_device(bigip: &BigIpConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if bigip.url.trim().is_empty() {
        errors.push(ValidationError::Missing("bigip.url"));
    }
    if bigip.user.trim().is_empty() {
        errors.push(ValidationError::Missing("bigip.user"));
    }
    if bigip.pass.is_empty() {
        errors.push(ValidationError::Missing("bigip.pass"));
    }
    if bigip.partitions.iter().all(|p| p.trim().is_empty()) {
        errors.push(ValidationError::Missing("bigip.partitions"));
    }
    if bigip.external_addr.trim().is_empty() {
        errors.push(ValidationError::Missing("bigip.external_addr"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the full configuration.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_device(&config.bigip).err().unwrap_or_default();

    if !config.bigip.url.trim().is_empty() {
        if let Err(e) = url::Url::parse(&config.bigip.url) {
            errors.push(ValidationError::InvalidUrl {
                url: config.bigip.url.clone(),
                reason: e.to_string(),
            });
        }
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if route.uri.trim().is_empty() {
            errors.push(ValidationError::EmptyRoute);
            continue;
        }
        let uri = RouteUri::new(&route.uri);
        if !seen.insert(uri.clone()) {
            errors.push(ValidationError::DuplicateRoute(uri.to_string()));
        }
        for endpoint in &route.endpoints {
            if Endpoint::parse(endpoint).is_none() {
                errors.push(ValidationError::InvalidEndpoint {
                    uri: uri.to_string(),
                    endpoint: endpoint.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
