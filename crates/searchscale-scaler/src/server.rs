//! External scaler gRPC server.
//!
//! Implements the KEDA `ExternalScaler` service on top of a
//! [`SignalSource`]. `IsActive` and `GetMetrics` run one query per call;
//! `GetMetricSpec` only reads metadata; `StreamIsActive` hands the session
//! to [`poll_activity`].

use std::sync::Arc;
use std::time::Duration;

use searchscale_query::{ErrorKind, QueryError, SignalSource};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::metadata::{ScalerMetadata, target_value};
use crate::proto;
use crate::proto::external_scaler_server::{ExternalScaler, ExternalScalerServer};
use crate::stream::{ActivityItem, POLL_INTERVAL, poll_activity};

/// Name of the single metric this scaler reports.
pub const METRIC_NAME: &str = "searchMatchDocCount";

/// gRPC implementation of the external scaler service.
pub struct ScalerServer<S> {
    source: Arc<S>,
    poll_interval: Duration,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<S: SignalSource> ScalerServer<S> {
    /// Create a new scaler server backed by `source`.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            poll_interval: POLL_INTERVAL,
            shutdown: None,
        }
    }

    /// Override the streaming poll period.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// End open streaming sessions when `shutdown` flips to `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Get the tonic service for mounting on a gRPC server.
    pub fn into_service(self) -> ExternalScalerServer<Self> {
        ExternalScalerServer::new(self)
    }

    async fn signal(&self, metadata: &ScalerMetadata) -> Result<i64, Status> {
        self.source
            .fetch_signal(&metadata.query)
            .await
            .map_err(|e| query_status(&e))
    }
}

/// Map a query failure onto the gRPC status taxonomy.
pub fn query_status(err: &QueryError) -> Status {
    match err.kind() {
        ErrorKind::InvalidArgument => Status::invalid_argument(err.to_string()),
        ErrorKind::NotFound => Status::not_found(err.to_string()),
        ErrorKind::Internal => Status::internal(err.to_string()),
    }
}

#[tonic::async_trait]
impl<S: SignalSource> ExternalScaler for ScalerServer<S> {
    type StreamIsActiveStream = ReceiverStream<ActivityItem>;

    async fn is_active(
        &self,
        request: Request<proto::ScaledObjectRef>,
    ) -> Result<Response<proto::IsActiveResponse>, Status> {
        let scaled_object = request.into_inner();
        let metadata = ScalerMetadata::parse(&scaled_object.scaler_metadata)?;

        let signal = self.signal(&metadata).await?;
        let result = metadata.is_active(signal);

        debug!(
            name = %scaled_object.name,
            namespace = %scaled_object.namespace,
            signal,
            threshold = metadata.activation_target_value,
            result,
            "is_active"
        );

        Ok(Response::new(proto::IsActiveResponse { result }))
    }

    async fn stream_is_active(
        &self,
        request: Request<proto::ScaledObjectRef>,
    ) -> Result<Response<Self::StreamIsActiveStream>, Status> {
        let scaled_object = request.into_inner();
        let metadata = ScalerMetadata::parse(&scaled_object.scaler_metadata)?;

        debug!(
            name = %scaled_object.name,
            namespace = %scaled_object.namespace,
            "stream_is_active"
        );

        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(poll_activity(
            Arc::clone(&self.source),
            metadata,
            self.poll_interval,
            tx,
            self.shutdown.clone(),
        ));

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn get_metric_spec(
        &self,
        request: Request<proto::ScaledObjectRef>,
    ) -> Result<Response<proto::GetMetricSpecResponse>, Status> {
        let scaled_object = request.into_inner();
        let target_size = target_value(&scaled_object.scaler_metadata);

        debug!(
            name = %scaled_object.name,
            namespace = %scaled_object.namespace,
            target_size,
            "get_metric_spec"
        );

        Ok(Response::new(proto::GetMetricSpecResponse {
            metric_specs: vec![proto::MetricSpec {
                metric_name: METRIC_NAME.to_string(),
                target_size,
                target_size_float: target_size as f64,
            }],
        }))
    }

    async fn get_metrics(
        &self,
        request: Request<proto::GetMetricsRequest>,
    ) -> Result<Response<proto::GetMetricsResponse>, Status> {
        let scaled_object = request.into_inner().scaled_object_ref.unwrap_or_default();
        let metadata = ScalerMetadata::parse(&scaled_object.scaler_metadata)?;

        let value = self.signal(&metadata).await?;

        debug!(
            name = %scaled_object.name,
            namespace = %scaled_object.namespace,
            value,
            "get_metrics"
        );

        Ok(Response::new(proto::GetMetricsResponse {
            metric_values: vec![proto::MetricValue {
                metric_name: METRIC_NAME.to_string(),
                metric_value: value,
                metric_value_float: value as f64,
            }],
        }))
    }
}
