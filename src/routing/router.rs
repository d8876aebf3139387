//! Route classification.
//!
//! # Responsibilities
//! - Classify each request into exactly one [`RouteDecision`]
//! - Apply the fixed priority chain: health, static asset, proxy, SPA fallback
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Preflight requests never reach the router; the CORS filter answers them
//! - The static stage runs as a file service in front of [`EdgeRouter::decide`]
//!   and hands over only the requests it declined, so static assets win over
//!   the proxy prefix
//! - The decision travels with the response as an extension

use axum::http::Method;

use crate::routing::matcher::{ExactPathMatcher, Matcher, MethodMatcher, PathPrefixMatcher};

/// Path answered by the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Where a request went. Computed once per request and attached to the
/// response through `Response::extensions()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Health,
    StaticAsset,
    ProxyMatch,
    SpaFallback,
}

impl RouteDecision {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RouteDecision::Health => "health",
            RouteDecision::StaticAsset => "static",
            RouteDecision::ProxyMatch => "proxy",
            RouteDecision::SpaFallback => "spa",
        }
    }
}

/// The edge routing table for everything the static stage does not serve.
#[derive(Debug)]
pub struct EdgeRouter {
    health: MethodMatcher,
    proxy: PathPrefixMatcher,
}

impl EdgeRouter {
    pub fn new(proxy_prefix: &str) -> Self {
        Self {
            health: MethodMatcher::new(
                vec![Method::GET, Method::HEAD],
                Box::new(ExactPathMatcher::new(HEALTH_PATH)),
            ),
            proxy: PathPrefixMatcher::new(proxy_prefix),
        }
    }

    pub fn proxy_prefix(&self) -> &str {
        self.proxy.prefix()
    }

    /// Classify a request that no static file answered.
    pub fn decide(&self, method: &Method, path: &str) -> RouteDecision {
        if self.health.matches(method, path) {
            return RouteDecision::Health;
        }

        if self.proxy.matches(method, path) {
            return RouteDecision::ProxyMatch;
        }

        RouteDecision::SpaFallback
    }
}
