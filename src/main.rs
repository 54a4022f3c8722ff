//! multirest gateway binary.
//!
//! Serves a small demo application wrapped with the batch endpoint; real
//! deployments embed [`HttpServer`] around their own router.

use std::path::PathBuf;

use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use tokio::net::TcpListener;

use multirest::config::{load_config, GatewayConfig};
use multirest::http::HttpServer;
use multirest::lifecycle::Shutdown;
use multirest::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "multirest", about = "HTTP batch fan-out gateway")]
struct Args {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoint = %config.batch.endpoint,
        concurrency = config.batch.concurrency,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(demo_app(), config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Tiny built-in application for exercising the gateway locally.
fn demo_app() -> Router {
    Router::new()
        .route(
            "/demo/hello",
            get(|| async { Json(serde_json::json!({ "hello": "world" })) }),
        )
        .route(
            "/demo/echo",
            post(|Json(body): Json<serde_json::Value>| async move { Json(body) }),
        )
}
