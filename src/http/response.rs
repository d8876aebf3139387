//! Response handling and transformation.
//!
//! # Responsibilities
//! - Build the uniform JSON error body
//! - Mark responses produced because the upstream failed
//! - Strip hop-by-hop headers, and those `Connection` names, in both directions
//!
//! # Design Decisions
//! - Every error leaving the edge is JSON: `{"error": ..., "message": ...}`
//! - Streaming responses avoid buffering entire body

use axum::{
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// `error` value for every failed forwarding attempt.
pub const PROXY_ERROR: &str = "Proxy error";

/// `error` value for requests no route can answer.
pub const NOT_FOUND: &str = "Not found";

/// Structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Build a JSON error response.
pub fn json_error(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

/// Error marker attached to responses the edge produced because forwarding
/// failed. Available through `Response::extensions()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    pub kind: &'static str,
    pub target: String,
}

/// Headers that describe a single connection and must not be forwarded.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Header names the sender declared connection-specific in `Connection`.
pub fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

/// Copy headers, dropping hop-by-hop ones, those named by `Connection` and
/// any listed in `skip`.
pub fn copy_end_to_end(source: &HeaderMap, skip: &[HeaderName]) -> HeaderMap {
    let listed = connection_listed(source);
    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if is_hop_by_hop(name) || skip.contains(name) || listed.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
