//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (tracing, timeout, request marking)
//! - Start the rule refresher when the store is enabled
//! - Forward every request to the configured upstream

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::MarkConfig;
use crate::http::middleware::mark_middleware;
use crate::lifecycle::shutdown;
use crate::refresh::{RedisRuleSource, Refresher};
use crate::rules::MarkEngine;

/// State for the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Authority,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server that marks requests and forwards them upstream.
pub struct HttpServer {
    router: Router,
    config: MarkConfig,
    engine: Arc<MarkEngine>,
}

impl HttpServer {
    /// Create a new HTTP server, seeding the rules from the config.
    pub fn new(config: MarkConfig) -> Self {
        let engine = Arc::new(MarkEngine::from_config(&config));
        Self::with_engine(config, engine)
    }

    /// Create a server around an existing engine.
    pub fn with_engine(config: MarkConfig, engine: Arc<MarkEngine>) -> Self {
        let upstream = Authority::from_str(&config.listener.upstream).unwrap_or_else(|e| {
            tracing::error!(upstream = %config.listener.upstream, error = %e, "Invalid upstream, using 127.0.0.1:3000");
            Authority::from_static("127.0.0.1:3000")
        });

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState { upstream, client };
        let router = Self::build_router(&config, state, engine.clone());

        Self {
            router,
            config,
            engine,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MarkConfig, state: AppState, engine: Arc<MarkEngine>) -> Router {
        Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(engine, mark_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service_name = %self.config.service_name,
            rules = self.engine.store().len(),
            "HTTP server starting"
        );

        if self.config.redis.enabled {
            let refresher = Refresher::new(
                RedisRuleSource::new(&self.config.redis),
                self.engine.store().clone(),
                self.config.redis.clone(),
            );
            tokio::spawn(refresher.run(shutdown.resubscribe()));
        } else {
            tracing::info!("Rule store disabled, serving inline rules only");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &MarkConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<MarkEngine> {
        &self.engine
    }
}

/// Next stage: forward the (possibly marked) request to the upstream.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Invalid upstream URI").into_response();
        }
    };

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %state.upstream, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
