//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve and validate configuration
//! - Initialize logging, then metrics
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Cli, ConfigError, EdgeConfig};
use crate::http::{HttpServer, ProxyError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::{
    init_logging, init_metrics, MetricsObserver, Observers, ProxyObserver, TracingObserver,
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("metrics exporter: {0}")]
    Metrics(String),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Observers for the configured observability settings.
pub fn build_observer(config: &EdgeConfig) -> Arc<dyn ProxyObserver> {
    let mut observers =
        Observers::new(vec![Arc::new(TracingObserver) as Arc<dyn ProxyObserver>]);
    if config.observability.metrics_enabled {
        observers.push(Arc::new(MetricsObserver));
    }
    Arc::new(observers)
}

/// Run the edge server from parsed command-line arguments.
pub async fn start(cli: Cli) -> Result<(), StartupError> {
    let config = cli.resolve()?;
    init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-proxy starting");

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e: std::net::AddrParseError| StartupError::Metrics(e.to_string()))?;
        init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let observer = build_observer(&config);
    let address = config.bind_address();
    let server = HttpServer::with_observer(config, observer)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observer_follows_metrics_flag() {
        let mut config = EdgeConfig::default();
        let observer = build_observer(&config);
        assert!(format!("{:?}", observer).contains("TracingObserver"));
        assert!(!format!("{:?}", observer).contains("MetricsObserver"));

        config.observability.metrics_enabled = true;
        let observer = build_observer(&config);
        assert!(format!("{:?}", observer).contains("MetricsObserver"));
    }
}
