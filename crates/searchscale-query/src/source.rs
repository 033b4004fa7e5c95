//! Signal sources: one search template execution per signal.

use std::future::Future;

use tracing::debug;

use crate::client::{SearchTemplateRequest, StoreClient};
use crate::error::QueryResult;
use crate::params::parse_params;
use crate::projector::extract_signal;

/// Everything needed to produce one signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalQuery {
    /// Index (or alias/pattern) the template runs against.
    pub index: String,
    /// Name of the stored search template.
    pub template: String,
    /// Raw `key:value;key:value` template parameters.
    pub parameters: String,
    /// Dotted path to the numeric value in the response.
    pub value_location: String,
    /// Skip certificate validation for this query.
    pub unsafe_ssl: bool,
}

/// Produces an integer signal for a query.
///
/// Implementations make at most one attempt per call and never cache.
pub trait SignalSource: Send + Sync + 'static {
    fn fetch_signal(&self, query: &SignalQuery) -> impl Future<Output = QueryResult<i64>> + Send;
}

/// Signal source backed by the document store's search-template API.
#[derive(Clone)]
pub struct HttpSignalSource {
    client: StoreClient,
}

impl HttpSignalSource {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }
}

impl SignalSource for HttpSignalSource {
    async fn fetch_signal(&self, query: &SignalQuery) -> QueryResult<i64> {
        let params = parse_params(&query.parameters)?;
        let request = SearchTemplateRequest {
            id: query.template.clone(),
            params,
        };

        let doc = self
            .client
            .search_template(&query.index, &request, query.unsafe_ssl)
            .await?;

        let signal = extract_signal(&doc, &query.value_location)?;
        debug!(
            index = %query.index,
            template = %query.template,
            value_location = %query.value_location,
            signal,
            "signal fetched"
        );
        Ok(signal)
    }
}
