//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy forwarder produces:
//!     → hook.rs (ProxyObserver events: forward, outcome, stream error)
//!         → TracingObserver (structured log events)
//!         → MetricsObserver (counters, histograms)
//!
//! HTTP server produces:
//!     → tower-http TraceLayer spans, tagged with x-request-id
//!
//! Consumers:
//!     → logging.rs (stdout via tracing-subscriber)
//!     → metrics.rs (optional Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - The proxy core only knows the ProxyObserver trait
//! - Request ID flows through all subsystems and to the upstream
//! - Metrics are cheap (atomic increments)

pub mod hook;
pub mod logging;
pub mod metrics;

pub use hook::{ForwardEvent, Observers, OutcomeEvent, ProxyObserver, ProxyOutcome, TracingObserver};
pub use logging::init_logging;
pub use metrics::{init_metrics, MetricsObserver};
