//! Command-line and environment overrides.
//!
//! Every flag falls back to an environment variable, so the server can be
//! configured the same way under a process supervisor or a shell.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{EdgeConfig, RewritePolicyKind};
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "edge-proxy")]
#[command(about = "Serves a built SPA and forwards one path prefix to a fixed upstream", long_about = None)]
pub struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "EDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Listening port.
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Upstream base origin.
    #[arg(long, env = "UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Path prefix forwarded to the upstream.
    #[arg(long, env = "PROXY_PREFIX")]
    pub proxy_prefix: Option<String>,

    /// strip | replace-fixed | replace-preserve
    #[arg(long, env = "REWRITE_POLICY")]
    pub rewrite_policy: Option<RewritePolicyKind>,

    /// Replacement for the prefix (replace policies only).
    #[arg(long, env = "REWRITE_TARGET")]
    pub rewrite_target: Option<String>,

    /// Upstream timeout in seconds.
    #[arg(long, env = "PROXY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Skip upstream certificate verification.
    #[arg(long, env = "UPSTREAM_INSECURE_TLS")]
    pub insecure_tls: Option<bool>,

    /// Largest forwarded request body in bytes.
    #[arg(long, env = "MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Directory with the built SPA.
    #[arg(long, env = "ASSET_ROOT")]
    pub asset_root: Option<String>,

    /// SPA entry document name.
    #[arg(long, env = "SPA_INDEX")]
    pub spa_index: Option<String>,

    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, env = "METRICS_ENABLED")]
    pub metrics_enabled: Option<bool>,

    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Build the effective configuration: defaults, then file, then overrides.
    pub fn resolve(&self) -> Result<EdgeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => EdgeConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Apply the flags that were set on top of `config`.
    pub fn apply(&self, config: &mut EdgeConfig) {
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(url) = &self.upstream_url {
            config.upstream.origin = url.clone();
        }
        if let Some(prefix) = &self.proxy_prefix {
            config.upstream.prefix = prefix.clone();
        }
        if let Some(policy) = self.rewrite_policy {
            config.upstream.rewrite.policy = policy;
            // A policy switch without an explicit target must not inherit the old one.
            if self.rewrite_target.is_none() && policy == RewritePolicyKind::Strip {
                config.upstream.rewrite.target = None;
            }
        }
        if let Some(target) = &self.rewrite_target {
            config.upstream.rewrite.target = Some(target.clone());
        }
        if let Some(timeout) = self.timeout_secs {
            config.upstream.timeout_secs = timeout;
        }
        if let Some(insecure) = self.insecure_tls {
            config.upstream.insecure_tls = insecure;
        }
        if let Some(limit) = self.max_body_bytes {
            config.upstream.max_body_bytes = limit;
        }
        if let Some(root) = &self.asset_root {
            config.assets.root = root.clone();
        }
        if let Some(index) = &self.spa_index {
            config.assets.index = index.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(enabled) = self.metrics_enabled {
            config.observability.metrics_enabled = enabled;
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_address = addr.clone();
        }
    }
}
