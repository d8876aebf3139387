//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request the static stage declined (method, path)
//!     → router.rs (health, proxy prefix, SPA)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: exactly one RouteDecision
//!
//! Proxy-bound requests:
//!     → rewrite.rs (prefix rewrite policy)
//!     → upstream path
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same decision and upstream path

pub mod matcher;
pub mod rewrite;
pub mod router;

pub use rewrite::{PathRewriter, RewritePolicy};
pub use router::{EdgeRouter, RouteDecision, HEALTH_PATH};
