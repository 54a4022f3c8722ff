//! Batch fan-out subsystem.
//!
//! # Data Flow
//! ```text
//! outer JSON array body
//!     → types.rs (parse into ordered SubRequest descriptors)
//!     → dispatcher.rs (bounded worker pool, index-aligned result slots)
//!     → per item: http::forward (build sub-request, invoke, harvest)
//!     → BatchReply (results in input order + harvested Set-Cookie values)
//! ```
//!
//! # Design Decisions
//! - One `Dispatcher` instance owns its concurrency limit; no shared default
//! - Per-item failures become synthetic 500 result slots, never abort a batch
//! - Only a failure of the scheduling machinery aborts the whole call
//! - Set-Cookie values are applied in input order, not completion order

pub mod dispatcher;
pub mod error;
pub mod types;

pub use dispatcher::{Dispatcher, DEFAULT_CONCURRENCY};
pub use error::{BatchError, SubRequestError};
pub use types::{parse_batch, BatchReply, SubRequest, SubResult};
