//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the outbound request: rewritten path, original query, method,
//!   end-to-end headers minus `Host`, body bytes
//! - Send exactly one attempt, bounded by the configured timeout
//! - Stream the upstream status, headers and body back unchanged
//! - Translate transport failures into a JSON `5xx`
//!
//! # Design Decisions
//! - No retries: a POST replayed by the edge could duplicate side effects
//! - Redirects are relayed, never followed
//! - Dropping the handler future (client disconnect) drops the upstream
//!   request and releases its connection
//! - An error body is only produced before any upstream response exists;
//!   failures after headers are sent are reported and the stream is cut

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, HeaderName, Request, StatusCode},
    response::Response,
};
use futures_util::TryStreamExt;
use http_body_util::LengthLimitError;
use url::Url;

use crate::config::UpstreamConfig;
use crate::config::validation::ValidationError;
use crate::http::request::RequestIdExt;
use crate::http::response::{copy_end_to_end, json_error, UpstreamFailure, PROXY_ERROR};
use crate::observability::hook::{ForwardEvent, OutcomeEvent, ProxyObserver, ProxyOutcome};
use crate::routing::rewrite::PathRewriter;

/// Why a forwarding attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("could not connect to upstream: {0}")]
    Connect(String),

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    #[error("failed to build upstream client: {0}")]
    Client(String),

    #[error(transparent)]
    Config(#[from] ValidationError),
}

impl ProxyError {
    /// Status returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) | ProxyError::Connect(_) | ProxyError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Body(_) => StatusCode::BAD_REQUEST,
            ProxyError::InvalidTarget(_) | ProxyError::Client(_) | ProxyError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Timeout(_) => "timeout",
            ProxyError::Connect(_) => "connect",
            ProxyError::Transport(_) => "transport",
            ProxyError::BodyTooLarge { .. } => "body_too_large",
            ProxyError::Body(_) => "body",
            ProxyError::InvalidTarget(_) => "invalid_target",
            ProxyError::Client(_) => "client",
            ProxyError::Config(_) => "config",
        }
    }

    /// Classify a reqwest failure. Connect errors cover refused connections,
    /// DNS failures and TLS handshake failures.
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout(timeout)
        } else if err.is_connect() {
            ProxyError::Connect(describe(&err))
        } else {
            ProxyError::Transport(describe(&err))
        }
    }

    /// The JSON error response for this failure, carrying the error marker.
    pub fn into_response(self, target: &str) -> Response {
        let kind = self.kind();
        let mut response = json_error(self.status(), PROXY_ERROR, self.to_string());
        response.extensions_mut().insert(UpstreamFailure {
            kind,
            target: target.to_string(),
        });
        response
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Forwards proxy-prefix requests to the single upstream.
#[derive(Debug)]
pub struct ProxyForwarder {
    client: reqwest::Client,
    origin: Url,
    rewriter: PathRewriter,
    timeout: Duration,
    max_body_bytes: usize,
    observer: Arc<dyn ProxyObserver>,
}

impl ProxyForwarder {
    pub fn new(
        config: &UpstreamConfig,
        observer: Arc<dyn ProxyObserver>,
    ) -> Result<Self, ProxyError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ProxyError::InvalidTarget(format!("{}: {}", config.origin, e)))?;
        let rewriter = PathRewriter::from_config(config)?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()
            .map_err(|e| ProxyError::Client(describe(&e)))?;

        Ok(Self {
            client,
            origin,
            rewriter,
            timeout,
            max_body_bytes: config.max_body_bytes,
            observer,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn rewriter(&self) -> &PathRewriter {
        &self.rewriter
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upstream URL for an external path and query.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.origin.clone();
        url.set_path(&self.rewriter.rewrite(path));
        url.set_query(query);
        url
    }

    /// Forward one request. Always yields exactly one response.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let target = self.target_url(request.uri().path(), request.uri().query());
        let event = ForwardEvent {
            request_id: request.headers().request_id().to_string(),
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            target: target.to_string(),
        };

        self.observer.on_forward(&event);
        let mut attempt = InFlight::new(self.observer.clone(), event.clone());

        match self.send(request, target).await {
            Ok(upstream) => {
                attempt.finish(ProxyOutcome::Responded {
                    status: upstream.status(),
                });
                self.relay(upstream, event)
            }
            Err(err) => {
                attempt.finish(ProxyOutcome::Failed {
                    status: err.status(),
                    kind: err.kind(),
                    message: err.to_string(),
                });
                err.into_response(&event.target)
            }
        }
    }

    async fn send(&self, request: Request<Body>, target: Url) -> Result<reqwest::Response, ProxyError> {
        let (parts, body) = request.into_parts();

        if let Some(length) = parts
            .headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
        {
            if length > self.max_body_bytes {
                return Err(ProxyError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
        }

        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| {
                let over_limit = e
                    .source()
                    .is_some_and(|source| source.is::<LengthLimitError>());
                if over_limit {
                    ProxyError::BodyTooLarge {
                        limit: self.max_body_bytes,
                    }
                } else {
                    ProxyError::Body(e.to_string())
                }
            })?;

        // reqwest sets Host from the target URL and Content-Length from the body.
        let skip: [HeaderName; 2] = [header::HOST, header::CONTENT_LENGTH];
        let headers = copy_end_to_end(&parts.headers, &skip);

        self.client
            .request(parts.method, target)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| ProxyError::from_reqwest(e, self.timeout))
    }

    /// Turn the upstream response into ours without buffering the body.
    fn relay(&self, upstream: reqwest::Response, event: ForwardEvent) -> Response {
        let status = upstream.status();
        let headers = copy_end_to_end(upstream.headers(), &[]);

        let observer = self.observer.clone();
        let stream = upstream
            .bytes_stream()
            .inspect_err(move |err| observer.on_stream_error(&event, &describe(err)));

        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// Reports `Cancelled` if dropped before an outcome was recorded, which is
/// what happens when the client disconnects mid-forward.
struct InFlight {
    observer: Arc<dyn ProxyObserver>,
    event: Option<ForwardEvent>,
    started: Instant,
}

impl InFlight {
    fn new(observer: Arc<dyn ProxyObserver>, event: ForwardEvent) -> Self {
        Self {
            observer,
            event: Some(event),
            started: Instant::now(),
        }
    }

    fn finish(&mut self, outcome: ProxyOutcome) {
        if let Some(forward) = self.event.take() {
            self.observer.on_outcome(&OutcomeEvent {
                forward,
                outcome,
                elapsed: self.started.elapsed(),
            });
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.finish(ProxyOutcome::Cancelled);
    }
}
