//! searchscale-health — liveness and readiness over plain HTTP.
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/liveness` | always `200 OK` |
//! | GET | `/readiness` | `200 Ready` if the document store answers 200, else `503` |

pub mod checker;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use searchscale_query::StoreClient;

pub use checker::{ProbeResult, probe_store};

/// Shared state for the health handlers.
#[derive(Clone)]
pub struct HealthState {
    pub store: StoreClient,
}

/// Build the health router.
pub fn build_router(store: StoreClient) -> Router {
    Router::new()
        .route("/liveness", get(liveness))
        .route("/readiness", get(readiness))
        .with_state(HealthState { store })
}

/// GET /liveness
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /readiness
async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
    if probe_store(&state.store).await.is_ready() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "document store is not ready")
    }
}
