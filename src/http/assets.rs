//! Static asset serving and the SPA fallback.
//!
//! # Responsibilities
//! - Serve files under the asset root through `ServeDir` (streaming, Range,
//!   conditional requests, content type)
//! - Decline by calling the fallback service instead of producing a 404
//! - Serve the SPA entry document for unclaimed routes
//!
//! # Design Decisions
//! - `ServeDir` rejects `..` after percent-decoding; hidden segments are
//!   screened before it runs (see [`is_hidden`])
//! - Directory paths serve their own `index.html`
//! - Methods other than GET and HEAD fall through to the fallback

use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::http::response::{json_error, NOT_FOUND};

/// Read-only view of the built SPA on disk.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
    index: String,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the SPA entry document.
    pub fn entry_path(&self) -> PathBuf {
        self.root.join(&self.index)
    }

    /// File service over the asset root. Anything it cannot serve goes to
    /// `fallback` with the request untouched.
    pub fn serve_dir<F>(&self, fallback: F) -> ServeDir<F> {
        ServeDir::new(&self.root)
            .append_index_html_on_directories(true)
            .call_fallback_on_method_not_allowed(true)
            .fallback(fallback)
    }

    /// Respond with the SPA entry document.
    ///
    /// Only GET and HEAD get the document; other methods are not routes the
    /// client-side router can render.
    pub async fn spa_entry(&self, request: Request<Body>) -> Response {
        let method = request.method().clone();
        if method != Method::GET && method != Method::HEAD {
            return json_error(
                StatusCode::NOT_FOUND,
                NOT_FOUND,
                format!("Cannot {} this path", method),
            );
        }

        let path = self.entry_path();
        let response = ServeFile::new(&path)
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});

        if response.status() == StatusCode::NOT_FOUND {
            tracing::error!(path = %path.display(), "SPA entry document unavailable");
            return json_error(
                StatusCode::NOT_FOUND,
                NOT_FOUND,
                "Application entry document is missing",
            );
        }
        response.map(Body::new)
    }
}

/// True when any decoded path segment starts with a dot. Covers dotfiles,
/// `.` and `..`, in plain or percent-encoded form.
pub fn is_hidden(request_path: &str) -> bool {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    decoded
        .split(['/', '\\'])
        .any(|segment| segment.starts_with('.'))
}
