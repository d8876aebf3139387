//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer)
//!     → request.rs (x-request-id)
//!     → cors.rs (OPTIONS short-circuit; headers on the way out)
//!     → /health route, else assets.rs (ServeDir; hidden paths skipped)
//!     → declined requests: routing::EdgeRouter decides
//!         health.rs | proxy.rs | assets.rs (SPA entry)
//!     → response.rs (JSON errors, hop-by-hop stripping)
//!     → Send to client
//! ```

pub mod assets;
pub mod cors;
pub mod health;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use proxy::{ProxyError, ProxyForwarder};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::{ErrorBody, UpstreamFailure};
pub use server::HttpServer;
