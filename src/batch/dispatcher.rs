//! Bounded-concurrency batch dispatch.

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request};
use axum::response::Response;
use serde_json::Value;
use tower::{Service, ServiceExt};

use super::error::{BatchError, SubRequestError};
use super::types::{BatchReply, SubRequest, SubResult};
use crate::http::forward::{self, SubResponse};

/// Window width used when the configuration does not say otherwise.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Fans a batch of sub-requests out against one application service.
///
/// Each instance owns its concurrency limit.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    concurrency: usize,
}

impl Dispatcher {
    /// Create a dispatcher with the given worker-pool width.
    ///
    /// A width of zero would never admit an item, so it is clamped to one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// The configured worker-pool width.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Execute every descriptor against `inner` with at most `concurrency`
    /// sub-requests in flight at any instant.
    ///
    /// A fixed pool of workers pulls the next pending descriptor index from
    /// a shared counter, so the next item (in input order) starts the moment
    /// any in-flight item finishes (a sliding window, not a batch-of-batches
    /// split). Each worker writes its outcome into the result slot matching
    /// the descriptor's index, so the output array is aligned with the input
    /// regardless of completion order.
    ///
    /// Per-item failures (unsupported method, bad url, invoke error) are
    /// folded into their slot as `{status: 500, body: "<description>"}` and
    /// never affect sibling items. Only a failure of the scheduling
    /// machinery itself aborts the call, and then no partial array is
    /// returned.
    pub async fn dispatch<S>(
        &self,
        batch: Vec<SubRequest>,
        outer_headers: HeaderMap,
        inner: S,
    ) -> Result<BatchReply, BatchError>
    where
        S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
        S::Error: Display + Send,
        S::Future: Send,
    {
        let total = batch.len();
        if total == 0 {
            return Ok(BatchReply {
                results: Vec::new(),
                set_cookies: Vec::new(),
            });
        }

        let items = Arc::new(batch);
        let next_index = Arc::new(AtomicUsize::new(0));
        let workers = self.concurrency.min(total);

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let items = Arc::clone(&items);
            let next_index = Arc::clone(&next_index);
            let headers = outer_headers.clone();
            let service = inner.clone();

            handles.push(tokio::spawn(async move {
                let mut outcomes = Vec::new();
                loop {
                    let index = next_index.fetch_add(1, Ordering::SeqCst);
                    if index >= items.len() {
                        break;
                    }
                    let sub = items[index].clone();
                    tracing::debug!(index, method = %sub.method, url = %sub.url, "sub-request admitted");
                    outcomes.push((index, execute_one(sub, &headers, service.clone()).await));
                }
                outcomes
            }));
        }

        let mut slots: Vec<Option<SubResponse>> = Vec::new();
        slots.resize_with(total, || None);
        for handle in handles {
            let outcomes = handle
                .await
                .map_err(|e| BatchError::Scheduling(e.to_string()))?;
            for (index, outcome) in outcomes {
                slots[index] = Some(outcome);
            }
        }

        let mut results = Vec::with_capacity(total);
        let mut set_cookies = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            let sub_response = slot
                .ok_or_else(|| BatchError::Scheduling(format!("result slot {index} left unfilled")))?;
            set_cookies.extend(sub_response.set_cookies);
            results.push(SubResult {
                status: sub_response.status,
                body: sub_response.body,
            });
        }

        Ok(BatchReply {
            results,
            set_cookies,
        })
    }
}

/// Run one descriptor to a terminal outcome. Failures of any per-item stage
/// become a synthetic 500 slot, never an error.
async fn execute_one<S>(sub: SubRequest, outer_headers: &HeaderMap, service: S) -> SubResponse
where
    S: Service<Request<Body>, Response = Response>,
    S::Error: Display,
{
    let method = sub.method.clone();
    let url = sub.url.clone();

    match try_execute(sub, outer_headers, service).await {
        Ok(sub_response) => sub_response,
        Err(err) => {
            tracing::warn!(method = %method, url = %url, error = %err, "sub-request failed");
            SubResponse {
                status: 500,
                body: Value::String(err.to_string()),
                set_cookies: Vec::new(),
            }
        }
    }
}

async fn try_execute<S>(
    sub: SubRequest,
    outer_headers: &HeaderMap,
    service: S,
) -> Result<SubResponse, SubRequestError>
where
    S: Service<Request<Body>, Response = Response>,
    S::Error: Display,
{
    let request = forward::build_sub_request(&sub, outer_headers)?;
    let response = service
        .oneshot(request)
        .await
        .map_err(|e| SubRequestError::Invoke(e.to_string()))?;
    forward::harvest(response).await
}
