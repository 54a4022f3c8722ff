//! multirest: an HTTP batch fan-out gateway.
//!
//! One inbound `POST` carries an ordered JSON array of sub-request
//! descriptors `{method, url, body?}`. The gateway dispatches each
//! descriptor against the wrapped application with bounded concurrency and
//! answers with an order-aligned JSON array of `{status, body}` sub-results,
//! so a client batches several logical API calls into one network round
//! trip.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                  GATEWAY                      │
//!   POST /batch       │  ┌─────────┐      ┌─────────────────────┐    │
//!   ──────────────────┼─▶│  http   │─────▶│  batch::Dispatcher  │    │
//!   [{method,url,..}] │  │ server  │      │  (worker pool ≤ K)  │    │
//!                     │  └─────────┘      └──────────┬──────────┘    │
//!                     │                              │ oneshot       │
//!                     │                              ▼               │
//!                     │                    ┌──────────────────┐      │
//!   [{status,body},…] │                    │  application     │      │
//!   ◀─────────────────┼────────────────────│  Router (axum)   │      │
//!                     │                    └──────────────────┘      │
//!                     │                                               │
//!                     │  Cross-Cutting: config · observability ·      │
//!                     │                 lifecycle                      │
//!                     └──────────────────────────────────────────────┘
//! ```
//!
//! Cookies flow both ways: the outer `Cookie` header is forwarded to every
//! sub-request, and any `Set-Cookie` a sub-response emits is re-emitted on
//! the outer response.

// Core subsystems
pub mod batch;
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use batch::{BatchError, BatchReply, Dispatcher, SubRequest, SubResult};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
