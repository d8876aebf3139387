//! Route matching logic.
//!
//! # Responsibilities
//! - Match exact paths (the health endpoint)
//! - Match path prefixes on segment boundaries (the proxy prefix)
//! - Combine a path condition with an allowed method set
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/api` matches `/api`, `/api/` and `/api/x` but never `/apix`
//! - No regex to guarantee O(n) matching

use axum::http::Method;

/// Trait for matching a request line against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the method and path match this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        path == self.path
    }
}

/// Matches a path prefix on segment boundaries.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing slash is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Restricts an inner matcher to a set of methods.
#[derive(Debug)]
pub struct MethodMatcher {
    methods: Vec<Method>,
    inner: Box<dyn Matcher>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<Method>, inner: Box<dyn Matcher>) -> Self {
        Self { methods, inner }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.methods.contains(method) && self.inner.matches(method, path)
    }
}
