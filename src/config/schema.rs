//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Origin the original deployment forwards `/api` traffic to.
pub const DEFAULT_UPSTREAM_ORIGIN: &str =
    "https://healthmatebackend-875662263.development.catalystserverless.com";

/// Root configuration for the edge server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// The single upstream and its rewrite rule.
    pub upstream: UpstreamConfig,

    /// Static asset root and SPA entry document.
    pub assets: AssetConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl EdgeConfig {
    /// Socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Upstream target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base origin (scheme + host + optional port), no path.
    pub origin: String,

    /// Externally visible path prefix that is forwarded.
    pub prefix: String,

    /// How the prefix is rewritten before forwarding.
    pub rewrite: RewriteRule,

    /// Ceiling for one forwarded call, in seconds.
    pub timeout_secs: u64,

    /// Skip upstream certificate verification.
    pub insecure_tls: bool,

    /// Largest inbound request body forwarded, in bytes.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_UPSTREAM_ORIGIN.to_string(),
            prefix: "/api".to_string(),
            rewrite: RewriteRule::default(),
            timeout_secs: 60,
            insecure_tls: true,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Prefix rewrite policy as written in config.
///
/// `target` is required by the replace policies and rejected by `strip`;
/// see [`crate::config::validation`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RewriteRule {
    pub policy: RewritePolicyKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Default for RewriteRule {
    fn default() -> Self {
        Self {
            policy: RewritePolicyKind::ReplacePreserve,
            target: Some("/healthmate".to_string()),
        }
    }
}

/// The three rewrite policy families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewritePolicyKind {
    /// Drop the prefix, keep the remainder.
    Strip,
    /// Replace the whole path with the target.
    ReplaceFixed,
    /// Replace the prefix with the target, keep the remainder.
    ReplacePreserve,
}

impl std::str::FromStr for RewritePolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strip" => Ok(Self::Strip),
            "replace-fixed" => Ok(Self::ReplaceFixed),
            "replace-preserve" => Ok(Self::ReplacePreserve),
            other => Err(format!(
                "unknown rewrite policy '{}' (expected strip, replace-fixed or replace-preserve)",
                other
            )),
        }
    }
}

impl std::fmt::Display for RewritePolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Strip => "strip",
            Self::ReplaceFixed => "replace-fixed",
            Self::ReplacePreserve => "replace-preserve",
        };
        f.write_str(s)
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the built SPA.
    pub root: String,

    /// Entry document, relative to `root`.
    pub index: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: "dist".to_string(),
            index: "index.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
