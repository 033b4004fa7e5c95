//! searchscale-scaler — KEDA external scaler over search-template signals.
//!
//! # Architecture
//!
//! ```text
//! KEDA operator (gRPC client)
//!   └── ScalerServer<S: SignalSource>
//!       ├── IsActive()        → ScalerMetadata::parse → fetch_signal → signal > activation
//!       ├── GetMetricSpec()   → targetValue (default 50), no query
//!       ├── GetMetrics()      → ScalerMetadata::parse → fetch_signal → raw value
//!       └── StreamIsActive()  → poll_activity task per session
//!           ├── every 20 min: fetch_signal, push `true` if above activation
//!           ├── query errors: logged, session continues
//!           └── ends when the caller drops the stream or on shutdown
//! ```

pub mod metadata;
pub mod server;
pub mod stream;

#[cfg(test)]
mod testing;

/// Generated protobuf types and gRPC service stubs.
pub mod proto {
    tonic::include_proto!("externalscaler");
}

pub use metadata::{MetadataError, ScalerMetadata};
pub use server::{METRIC_NAME, ScalerServer, query_status};
pub use stream::{POLL_INTERVAL, poll_activity};
