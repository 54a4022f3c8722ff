//! Shared fixtures for integration tests: the sample application the batch
//! endpoint is exercised against, and a helper that serves it on an
//! ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use multirest::config::GatewayConfig;
use multirest::http::HttpServer;
use multirest::lifecycle::Shutdown;

/// What a sample handler saw of its request, echoed back for assertions.
fn request_report(method: &Method, uri: &Uri, headers: &HeaderMap, body: Value) -> Value {
    json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query().unwrap_or(""),
        "cookie": header_str(headers, header::COOKIE.as_str()),
        "testheader": header_str(headers, "testheader"),
        "body": body,
    })
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

async fn show(method: Method, uri: Uri, headers: HeaderMap) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(10)).await;
    Json(json!([
        request_report(&method, &uri, &headers, Value::Null),
        { "one": 1 },
        { "two": 2 },
    ]))
}

async fn mutate(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(10)).await;
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!([request_report(&method, &uri, &headers, body)]))
}

async fn remove() -> StatusCode {
    tokio::time::sleep(Duration::from_millis(10)).await;
    StatusCode::NO_CONTENT
}

async fn explode() -> Json<Value> {
    panic!("failed explicitly");
}

async fn serve_cookies(method: Method, uri: Uri, headers: HeaderMap) -> Response {
    tokio::time::sleep(Duration::from_millis(10)).await;
    let mut response =
        Json(json!([request_report(&method, &uri, &headers, Value::Null)])).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, HeaderValue::from_static("server-one=alpha"));
    response
        .headers_mut()
        .append(header::SET_COOKIE, HeaderValue::from_static("server-two=beta"));
    response
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "has_content_length": headers.contains_key(header::CONTENT_LENGTH),
        "cookie": header_str(&headers, header::COOKIE.as_str()),
        "testheader": header_str(&headers, "testheader"),
    }))
}

/// The application the batch endpoint fans out against.
pub fn sample_app() -> Router {
    Router::new()
        .route(
            "/api/one/{id}",
            get(show).post(mutate).put(mutate).patch(mutate).delete(remove),
        )
        .route("/api/two/{id}", get(show))
        .route("/api/fail", get(explode))
        .route("/api/servecookies", get(serve_cookies))
        .route("/api/headers", get(echo_headers))
}

/// Serve the sample app wrapped by the gateway on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(sample_app(), config);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
