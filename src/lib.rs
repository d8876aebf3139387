//! Edge server for a single-page application.
//!
//! Serves the built SPA from disk, forwards one path prefix to a fixed
//! upstream with a configurable prefix rewrite, answers CORS preflights and
//! reports liveness on `/health`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
