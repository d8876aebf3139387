//! Pluggable proxy observer.
//!
//! The forwarder reports every attempt through [`ProxyObserver`]. Callbacks run
//! synchronously on the request task and must not block.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};

/// A forwarding attempt about to be sent.
#[derive(Debug, Clone)]
pub struct ForwardEvent {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub target: String,
}

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// Upstream answered; its status is relayed unchanged.
    Responded { status: StatusCode },
    /// Forwarding failed and the edge answered with an error body.
    Failed {
        status: StatusCode,
        kind: &'static str,
        message: String,
    },
    /// The client went away before the upstream answered.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct OutcomeEvent {
    pub forward: ForwardEvent,
    pub outcome: ProxyOutcome,
    pub elapsed: Duration,
}

/// Receives forwarding events.
pub trait ProxyObserver: Send + Sync + std::fmt::Debug {
    /// Called before the upstream request is sent.
    fn on_forward(&self, _event: &ForwardEvent) {}

    /// Called once per attempt with its outcome.
    fn on_outcome(&self, _event: &OutcomeEvent) {}

    /// Called when the upstream body fails after headers were already sent.
    /// No error response can be written at that point; the stream is cut.
    fn on_stream_error(&self, _event: &ForwardEvent, _error: &str) {}
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProxyObserver for TracingObserver {
    fn on_forward(&self, event: &ForwardEvent) {
        tracing::info!(
            request_id = %event.request_id,
            method = %event.method,
            path = %event.path,
            target = %event.target,
            "[Proxy] forwarding request"
        );
    }

    fn on_outcome(&self, event: &OutcomeEvent) {
        let forward = &event.forward;
        let elapsed_ms = event.elapsed.as_millis() as u64;
        match &event.outcome {
            ProxyOutcome::Responded { status } => tracing::info!(
                request_id = %forward.request_id,
                method = %forward.method,
                path = %forward.path,
                target = %forward.target,
                status = status.as_u16(),
                elapsed_ms,
                "[Proxy] upstream responded"
            ),
            ProxyOutcome::Failed { status, kind, message } => tracing::error!(
                request_id = %forward.request_id,
                method = %forward.method,
                path = %forward.path,
                target = %forward.target,
                status = status.as_u16(),
                kind = %kind,
                error = %message,
                elapsed_ms,
                "[Proxy] forwarding failed"
            ),
            ProxyOutcome::Cancelled => tracing::warn!(
                request_id = %forward.request_id,
                method = %forward.method,
                path = %forward.path,
                target = %forward.target,
                elapsed_ms,
                "[Proxy] client disconnected before upstream answered"
            ),
        }
    }

    fn on_stream_error(&self, event: &ForwardEvent, error: &str) {
        tracing::error!(
            request_id = %event.request_id,
            method = %event.method,
            path = %event.path,
            target = %event.target,
            error = %error,
            "[Proxy] upstream body failed after headers were sent"
        );
    }
}

/// Fans events out to several observers in order.
#[derive(Debug, Default, Clone)]
pub struct Observers {
    inner: Vec<Arc<dyn ProxyObserver>>,
}

impl Observers {
    pub fn new(inner: Vec<Arc<dyn ProxyObserver>>) -> Self {
        Self { inner }
    }

    pub fn push(&mut self, observer: Arc<dyn ProxyObserver>) {
        self.inner.push(observer);
    }
}

impl ProxyObserver for Observers {
    fn on_forward(&self, event: &ForwardEvent) {
        for observer in &self.inner {
            observer.on_forward(event);
        }
    }

    fn on_outcome(&self, event: &OutcomeEvent) {
        for observer in &self.inner {
            observer.on_outcome(event);
        }
    }

    fn on_stream_error(&self, event: &ForwardEvent, error: &str) {
        for observer in &self.inner {
            observer.on_stream_error(event, error);
        }
    }
}
