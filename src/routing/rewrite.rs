//! Prefix rewriting for forwarded paths.
//!
//! The policy is fixed when the server starts. The same external path always
//! produces the same upstream path.

use crate::config::schema::{RewritePolicyKind, UpstreamConfig};
use crate::config::validation::ValidationError;

/// A validated rewrite policy. Unlike [`crate::config::RewriteRule`] it cannot
/// be in an ambiguous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewritePolicy {
    /// `/api/foo` → `/foo`
    Strip,
    /// `/api/foo` → `/target`
    ReplaceFixed(String),
    /// `/api/foo` → `/target/foo`
    ReplacePreserve(String),
}

/// Maps the external proxy prefix onto the path the upstream expects.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    prefix: String,
    policy: RewritePolicy,
}

impl PathRewriter {
    pub fn new(prefix: impl Into<String>, policy: RewritePolicy) -> Self {
        Self {
            prefix: prefix.into(),
            policy,
        }
    }

    /// Build the rewriter from upstream config, rejecting mismatched targets.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ValidationError> {
        let policy = match (config.rewrite.policy, config.rewrite.target.as_deref()) {
            (RewritePolicyKind::Strip, None) => RewritePolicy::Strip,
            (RewritePolicyKind::Strip, Some(target)) => {
                return Err(ValidationError::UnexpectedRewriteTarget(target.to_string()))
            }
            (kind, None) => return Err(ValidationError::MissingRewriteTarget(kind)),
            (RewritePolicyKind::ReplaceFixed, Some(target)) => {
                RewritePolicy::ReplaceFixed(target.to_string())
            }
            (RewritePolicyKind::ReplacePreserve, Some(target)) => {
                RewritePolicy::ReplacePreserve(target.to_string())
            }
        };
        Ok(Self::new(config.prefix.clone(), policy))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn policy(&self) -> &RewritePolicy {
        &self.policy
    }

    /// Rewrite an external path. Paths outside the prefix are returned as-is.
    pub fn rewrite(&self, path: &str) -> String {
        let remainder = match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return path.to_string(),
        };

        let rewritten = match &self.policy {
            RewritePolicy::Strip => remainder.to_string(),
            RewritePolicy::ReplaceFixed(target) => target.clone(),
            RewritePolicy::ReplacePreserve(target) => {
                format!("{}{}", target.trim_end_matches('/'), remainder)
            }
        };

        if rewritten.is_empty() {
            "/".to_string()
        } else {
            rewritten
        }
    }

    /// Human readable mapping for startup logs, e.g. `/api/* -> /healthmate/*`.
    pub fn describe(&self) -> String {
        match &self.policy {
            RewritePolicy::Strip => format!("{}/* -> /*", self.prefix),
            RewritePolicy::ReplaceFixed(target) => format!("{}/* -> {}", self.prefix, target),
            RewritePolicy::ReplacePreserve(target) => {
                format!("{}/* -> {}/*", self.prefix, target.trim_end_matches('/'))
            }
        }
    }
}
