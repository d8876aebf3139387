//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_proxy_requests_total` (counter): forwarded requests by method, status
//! - `edge_proxy_failures_total` (counter): failed forwards by kind
//! - `edge_proxy_cancelled_total` (counter): forwards abandoned by the client
//! - `edge_proxy_stream_errors_total` (counter): body failures after headers
//! - `edge_proxy_upstream_duration_seconds` (histogram): upstream latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is optional and serves its own listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::observability::hook::{ForwardEvent, OutcomeEvent, ProxyObserver, ProxyOutcome};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Observer that turns proxy events into metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl ProxyObserver for MetricsObserver {
    fn on_outcome(&self, event: &OutcomeEvent) {
        let method = event.forward.method.to_string();
        match &event.outcome {
            ProxyOutcome::Responded { status } => {
                metrics::counter!(
                    "edge_proxy_requests_total",
                    "method" => method,
                    "status" => status.as_u16().to_string()
                )
                .increment(1);
            }
            ProxyOutcome::Failed { status, kind, .. } => {
                metrics::counter!(
                    "edge_proxy_requests_total",
                    "method" => method,
                    "status" => status.as_u16().to_string()
                )
                .increment(1);
                metrics::counter!("edge_proxy_failures_total", "kind" => *kind).increment(1);
            }
            ProxyOutcome::Cancelled => {
                metrics::counter!("edge_proxy_cancelled_total").increment(1);
            }
        }
        metrics::histogram!("edge_proxy_upstream_duration_seconds")
            .record(event.elapsed.as_secs_f64());
    }

    fn on_stream_error(&self, _event: &ForwardEvent, _error: &str) {
        metrics::counter!("edge_proxy_stream_errors_total").increment(1);
    }
}
