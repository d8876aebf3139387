//! Liveness endpoint.
//!
//! Answers `GET /health` without touching the upstream, so supervisors see the
//! process as alive even while the upstream is down.

use axum::{response::IntoResponse, response::Response, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn now() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub fn health_response() -> Response {
    Json(HealthStatus::now()).into_response()
}
