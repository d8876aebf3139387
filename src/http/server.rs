//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: health route, static file stage, dispatcher
//! - Wire up middleware (tracing, request ID, CORS)
//! - Dispatch each request through the priority chain
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{any, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::EdgeConfig;
use crate::http::assets::{is_hidden, StaticAssets};
use crate::http::health::health_response;
use crate::http::proxy::{ProxyError, ProxyForwarder};
use crate::http::{cors, request};
use crate::observability::hook::{ProxyObserver, TracingObserver};
use crate::routing::{EdgeRouter, RouteDecision, HEALTH_PATH};

/// Application state injected into handlers. Read-only for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EdgeConfig>,
    pub router: Arc<EdgeRouter>,
    pub assets: Arc<StaticAssets>,
    pub forwarder: Arc<ProxyForwarder>,
}

/// HTTP server for the edge.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server that reports proxy events through `tracing`.
    pub fn new(config: EdgeConfig) -> Result<Self, ProxyError> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Create a server with a custom proxy observer.
    pub fn with_observer(
        config: EdgeConfig,
        observer: Arc<dyn ProxyObserver>,
    ) -> Result<Self, ProxyError> {
        let forwarder = Arc::new(ProxyForwarder::new(&config.upstream, observer)?);
        let assets = Arc::new(StaticAssets::new(
            &config.assets.root,
            config.assets.index.clone(),
        ));
        let router = Arc::new(EdgeRouter::new(&config.upstream.prefix));

        let state = AppState {
            config: Arc::new(config),
            router,
            assets,
            forwarder,
        };

        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Health is an explicit route so no file can shadow it. Everything else
    /// goes to the static stage, which hands declined requests to [`dispatch`].
    fn build_router(state: AppState) -> Router {
        let declined: MethodRouter = any(dispatch).with_state(state.clone());
        let static_stage = ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(state.clone(), screen_static))
            .service(state.assets.serve_dir(declined));

        let routes = Router::new()
            .route(HEALTH_PATH, any(dispatch))
            .fallback_service(static_stage)
            .with_state(state);

        request::with_request_id(cors::apply(routes)).layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.state.config
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let forwarder = &self.state.forwarder;
        tracing::info!(address = %addr, "HTTP server starting");
        tracing::info!(
            prefix = %self.state.router.proxy_prefix(),
            upstream = %forwarder.origin(),
            rewrite = %forwarder.rewriter().describe(),
            timeout_secs = forwarder.timeout().as_secs(),
            asset_root = %self.state.assets.root().display(),
            "Proxy configured"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Hidden paths skip the file service. Anything the file service answers
/// itself is tagged as a static asset.
async fn screen_static(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_hidden(request.uri().path()) {
        return dispatch(State(state), request).await;
    }

    let mut response = next.run(request).await;
    if response.extensions().get::<RouteDecision>().is_none() {
        response.extensions_mut().insert(RouteDecision::StaticAsset);
    }
    response
}

/// Handles everything the static stage declined. Exactly one stage answers.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let decision = state.router.decide(&method, request.uri().path());

    tracing::debug!(
        method = %method,
        path = %request.uri().path(),
        route = decision.label(),
        "Route decided"
    );

    let mut response = match decision {
        RouteDecision::Health => health_response(),
        RouteDecision::ProxyMatch => state.forwarder.forward(request).await,
        RouteDecision::SpaFallback | RouteDecision::StaticAsset => {
            state.assets.spa_entry(request).await
        }
    };
    response.extensions_mut().insert(decision);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use std::fs;
    use tower::ServiceExt;

    fn server() -> (tempfile::TempDir, HttpServer) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html>spa</html>").unwrap();
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/schema.json"), "{}").unwrap();
        fs::write(dir.path().join("health"), "shadowed").unwrap();

        let mut config = EdgeConfig::default();
        // Nothing listens on port 9; proxied requests fail fast.
        config.upstream.origin = "http://127.0.0.1:9".into();
        config.upstream.timeout_secs = 2;
        config.assets.root = dir.path().display().to_string();
        let server = HttpServer::new(config).unwrap();
        (dir, server)
    }

    async fn decision(server: &HttpServer, method: Method, uri: &str) -> RouteDecision {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        *response.extensions().get::<RouteDecision>().unwrap()
    }

    #[tokio::test]
    async fn priority_chain_end_to_end() {
        let (_dir, server) = server();

        let cases = [
            (Method::GET, "/health", RouteDecision::Health),
            (Method::HEAD, "/health", RouteDecision::Health),
            (Method::GET, "/assets/app.js", RouteDecision::StaticAsset),
            (Method::HEAD, "/assets/app.js", RouteDecision::StaticAsset),
            (Method::GET, "/", RouteDecision::StaticAsset),
            (Method::GET, "/api/schema.json", RouteDecision::StaticAsset),
            (Method::GET, "/api/users", RouteDecision::ProxyMatch),
            (Method::POST, "/api/schema.json", RouteDecision::ProxyMatch),
            (Method::GET, "/dashboard/settings", RouteDecision::SpaFallback),
            (Method::GET, "/.env", RouteDecision::SpaFallback),
            (Method::GET, "/assets/%2e%2e/.env", RouteDecision::SpaFallback),
            (Method::POST, "/assets/app.js", RouteDecision::SpaFallback),
            (Method::POST, "/health", RouteDecision::SpaFallback),
        ];

        for (method, uri, expected) in cases {
            assert_eq!(decision(&server, method.clone(), uri).await, expected, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn hidden_file_is_never_served() {
        let (_dir, server) = server();
        let request = Request::builder().uri("/.env").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<html>spa</html>");
    }
}
