//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject ambiguous rewrite rules before the server starts
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{EdgeConfig, RewritePolicyKind};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.origin '{0}' is not a valid URL")]
    InvalidOrigin(String),

    #[error("upstream.origin must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("upstream.origin must be a bare origin without path or query: '{0}'")]
    OriginHasPath(String),

    #[error("upstream.prefix '{0}' must start with '/', must not be '/' and must not end with '/'")]
    InvalidPrefix(String),

    #[error("rewrite policy '{0}' requires a target")]
    MissingRewriteTarget(RewritePolicyKind),

    #[error("rewrite policy 'strip' does not take a target (got '{0}')")]
    UnexpectedRewriteTarget(String),

    #[error("rewrite target '{0}' must start with '/'")]
    InvalidRewriteTarget(String),

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("upstream.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("assets.index '{0}' must be a plain file name")]
    InvalidIndex(String),

    #[error("listener.host '{0}' does not form a valid bind address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate the full configuration, collecting every error.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bind_address().parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.host.clone()));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.origin) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::InvalidOrigin(upstream.origin.clone()));
            }
            if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::OriginHasPath(upstream.origin.clone()));
            }
        }
        Err(_) => errors.push(ValidationError::InvalidOrigin(upstream.origin.clone())),
    }

    let prefix = &upstream.prefix;
    if !prefix.starts_with('/') || prefix == "/" || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    match (upstream.rewrite.policy, upstream.rewrite.target.as_deref()) {
        (RewritePolicyKind::Strip, Some(target)) => {
            errors.push(ValidationError::UnexpectedRewriteTarget(target.to_string()));
        }
        (RewritePolicyKind::Strip, None) => {}
        (policy, None) => errors.push(ValidationError::MissingRewriteTarget(policy)),
        (_, Some(target)) => {
            if !target.starts_with('/') {
                errors.push(ValidationError::InvalidRewriteTarget(target.to_string()));
            }
        }
    }

    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if upstream.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let index = &config.assets.index;
    if index.is_empty() || index.contains('/') || index.contains('\\') || index.starts_with('.') {
        errors.push(ValidationError::InvalidIndex(index.clone()));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
