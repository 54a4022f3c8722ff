//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! POST /batch (JSON array body)
//!     → server.rs (parse outer body, reject malformed)
//!     → batch::Dispatcher (bounded worker pool)
//!     → forward.rs (per item: build sub-request, oneshot the app, harvest)
//!     → server.rs (order-aligned JSON array + merged Set-Cookie headers)
//! ```

pub mod forward;
pub mod server;

pub use server::HttpServer;
