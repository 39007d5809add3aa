//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate host and location scopes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::routing::matcher::normalize_host;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} \"{value}\"")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid upstream \"{value}\" in {scope}, expected host:port")]
    InvalidUpstream { scope: String, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("listener.max_in_flight must be greater than zero")]
    ZeroMaxInFlight,

    #[error("host name must not be empty")]
    EmptyHostName,

    #[error("duplicate host \"{0}\"")]
    DuplicateHost(String),

    #[error("location \"{prefix}\" in host {host} must start with '/'")]
    RelativeLocation { host: String, prefix: String },

    #[error("duplicate location \"{prefix}\" in host {host}")]
    DuplicateLocation { host: String, prefix: String },
}

/// Check everything serde cannot.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_in_flight == 0 {
        errors.push(ValidationError::ZeroMaxInFlight);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    check_upstream(&mut errors, "default_upstream", config.default_upstream.as_deref());

    let mut hosts = HashSet::new();
    for host in &config.hosts {
        let name = normalize_host(&host.name);
        if name.is_empty() {
            errors.push(ValidationError::EmptyHostName);
        } else if !hosts.insert(name) {
            errors.push(ValidationError::DuplicateHost(host.name.clone()));
        }
        check_upstream(&mut errors, &format!("host {}", host.name), host.upstream.as_deref());

        let mut prefixes = HashSet::new();
        for location in &host.locations {
            if !location.path_prefix.starts_with('/') {
                errors.push(ValidationError::RelativeLocation {
                    host: host.name.clone(),
                    prefix: location.path_prefix.clone(),
                });
            }
            if !prefixes.insert(location.path_prefix.as_str()) {
                errors.push(ValidationError::DuplicateLocation {
                    host: host.name.clone(),
                    prefix: location.path_prefix.clone(),
                });
            }
            check_upstream(
                &mut errors,
                &format!("host {} location {}", host.name, location.path_prefix),
                location.upstream.as_deref(),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream(errors: &mut Vec<ValidationError>, scope: &str, upstream: Option<&str>) {
    let Some(value) = upstream else {
        return;
    };
    let valid = value
        .parse::<Authority>()
        .map(|authority| authority.port_u16().is_some() && !authority.host().is_empty())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUpstream {
            scope: scope.to_string(),
            value: value.to_string(),
        });
    }
}
