//! `StreamIsActive` session loop.
//!
//! One task per open stream. It wakes on a fixed period, re-runs the
//! query and pushes `result: true` whenever the signal is above the
//! activation threshold. Query failures are logged and the session keeps
//! going. The task ends as soon as the caller drops the stream or the
//! process shuts down.

use std::sync::Arc;
use std::time::Duration;

use searchscale_query::SignalSource;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tonic::Status;
use tracing::{debug, info, warn};

use crate::metadata::ScalerMetadata;
use crate::proto::IsActiveResponse;

/// Period between queries of a streaming session.
pub const POLL_INTERVAL: Duration = Duration::from_secs(20 * 60);

/// Item type of the `StreamIsActive` response stream.
pub type ActivityItem = Result<IsActiveResponse, Status>;

/// Run a streaming session until the receiver side of `tx` is dropped or
/// `shutdown` flips to `true`.
///
/// The first query runs one full `period` after the session opens.
pub async fn poll_activity<S: SignalSource>(
    source: Arc<S>,
    metadata: ScalerMetadata,
    period: Duration,
    tx: mpsc::Sender<ActivityItem>,
    mut shutdown: Option<watch::Receiver<bool>>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let index = metadata.query.index.clone();
    info!(%index, period_secs = period.as_secs(), "activity stream opened");

    loop {
        tokio::select! {
            // Cancellation is checked before the tick.
            biased;

            _ = tx.closed() => {
                info!(%index, "activity stream closed by caller");
                break;
            }
            _ = shutdown_requested(&mut shutdown) => {
                info!(%index, "activity stream shutting down");
                break;
            }
            _ = ticker.tick() => {
                let result = source.fetch_signal(&metadata.query).await;

                // The query is allowed to finish, but nobody is listening anymore.
                if tx.is_closed() {
                    debug!(%index, "caller left during query, discarding result");
                    break;
                }
                if shutdown_flagged(&shutdown) {
                    debug!(%index, "shutdown during query, discarding result");
                    break;
                }

                match result {
                    Ok(signal) if metadata.is_active(signal) => {
                        debug!(%index, signal, threshold = metadata.activation_target_value, "workload active");
                        tokio::select! {
                            biased;

                            _ = shutdown_requested(&mut shutdown) => {
                                info!(%index, "activity stream shutting down");
                                break;
                            }
                            sent = tx.send(Ok(IsActiveResponse { result: true })) => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Ok(signal) => {
                        debug!(%index, signal, threshold = metadata.activation_target_value, "workload inactive");
                    }
                    Err(e) => {
                        warn!(%index, error = %e, "activity poll failed, will retry next period");
                    }
                }
            }
        }
    }
}

/// Resolves once shutdown is requested. Never resolves without a receiver.
async fn shutdown_requested(shutdown: &mut Option<watch::Receiver<bool>>) {
    match shutdown {
        // A dropped sender also counts as shutdown.
        Some(rx) => {
            let _ = rx.wait_for(|stop| *stop).await;
        }
        None => std::future::pending().await,
    }
}

fn shutdown_flagged(shutdown: &Option<watch::Receiver<bool>>) -> bool {
    match shutdown {
        Some(rx) => *rx.borrow() || rx.has_changed().is_err(),
        None => false,
    }
}
