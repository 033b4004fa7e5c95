//! Readiness probe against the document store.

use axum::http::StatusCode;
use searchscale_query::StoreClient;
use tracing::debug;

/// Result of a single readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The store answered 200.
    Ready,
    /// The store answered with any other status.
    NotReady(StatusCode),
    /// The store could not be reached.
    Failed,
}

impl ProbeResult {
    pub fn is_ready(self) -> bool {
        self == ProbeResult::Ready
    }
}

/// Probe the store's base URL. Never errors; failures become `Failed`.
pub async fn probe_store(store: &StoreClient) -> ProbeResult {
    match store.ping().await {
        Ok(status) if status == StatusCode::OK => ProbeResult::Ready,
        Ok(status) => {
            debug!(%status, url = %store.config().url, "readiness probe non-200");
            ProbeResult::NotReady(status)
        }
        Err(e) => {
            debug!(error = %e, url = %store.config().url, "readiness probe failed");
            ProbeResult::Failed
        }
    }
}
