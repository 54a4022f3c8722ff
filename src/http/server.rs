//! HTTP server setup and the batch endpoint.
//!
//! # Responsibilities
//! - Merge the batch route into the embedder's application router
//! - Wire up middleware (timeout, request ID, tracing, body limit)
//! - Hand inbound batches to the dispatcher
//! - Shape the outer response (result array + merged Set-Cookie headers)
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::batch::{parse_batch, Dispatcher};
use crate::config::GatewayConfig;
use crate::observability::metrics;

/// Application state injected into the batch handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// The bare application router sub-requests are dispatched against.
    /// The batch route is merged on top of this, never into it, so a batch
    /// cannot recurse into itself.
    pub app: Router,
}

/// HTTP server hosting an application plus its batch endpoint.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Wrap `app` with the batch endpoint and middleware stack.
    pub fn new(app: Router, config: GatewayConfig) -> Self {
        // A handler panic must degrade to a 500 sub-response instead of
        // tearing down the worker that ran it.
        let app = app.layer(CatchPanicLayer::new());

        let dispatcher = Arc::new(Dispatcher::new(config.batch.concurrency));
        let state = AppState {
            dispatcher,
            app: app.clone(),
        };

        let router = Self::build_router(app, &config, state);
        Self { router, config }
    }

    /// Build the outer router with all middleware layers.
    fn build_router(app: Router, config: &GatewayConfig, state: AppState) -> Router {
        let batch_route = Router::new()
            .route(&config.batch.endpoint, post(batch_handler))
            .with_state(state);

        app.merge(batch_route)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoint = %self.config.batch.endpoint,
            concurrency = self.config.batch.concurrency,
            "HTTP server starting"
        );

        let app = self.router.into_make_service();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = shutdown.recv() => {},
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Batch endpoint handler.
/// Parses the outer body, fans the descriptors out, merges the reply.
async fn batch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let batch = match parse_batch(&body) {
        Ok(batch) => batch,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting batch");
            metrics::record_batch(0, 400, started);
            return err.into_response();
        }
    };

    let methods: Vec<String> = batch.iter().map(|sub| sub.method.clone()).collect();
    tracing::debug!(size = batch.len(), "dispatching batch");

    match state
        .dispatcher
        .dispatch(batch, headers, state.app.clone())
        .await
    {
        Ok(reply) => {
            for (method, result) in methods.iter().zip(&reply.results) {
                metrics::record_sub_request(method, result.status);
            }
            metrics::record_batch(reply.results.len(), 200, started);

            let mut response = Json(&reply.results).into_response();
            for cookie in reply.set_cookies {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            response
        }
        Err(err) => {
            tracing::error!(error = %err, "batch dispatch failed");
            metrics::record_batch(methods.len(), 500, started);
            err.into_response()
        }
    }
}
