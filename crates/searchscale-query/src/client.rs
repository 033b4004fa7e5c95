//! HTTP client for the document store.
//!
//! Holds two prebuilt `reqwest` clients: one validating certificates and
//! one with validation disabled, selected per call. Both carry the fixed
//! request timeout.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{QueryError, QueryResult};

/// Timeout applied to every request against the document store.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of a search-template execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTemplateRequest {
    /// Name of the stored template.
    pub id: String,
    pub params: BTreeMap<String, String>,
}

/// Shared, cheaply cloneable client for the document store.
#[derive(Clone)]
pub struct StoreClient {
    config: StoreConfig,
    strict: reqwest::Client,
    insecure: reqwest::Client,
}

impl StoreClient {
    /// Build a client for the given store.
    pub fn new(config: StoreConfig) -> QueryResult<Self> {
        let strict = build_http_client(false)?;
        let insecure = build_http_client(true)?;
        Ok(Self {
            config,
            strict,
            insecure,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn http(&self, insecure: bool) -> &reqwest::Client {
        if insecure { &self.insecure } else { &self.strict }
    }

    /// Execute a stored search template against `index`.
    ///
    /// Returns the response document, which must be a JSON object.
    pub async fn search_template(
        &self,
        index: &str,
        request: &SearchTemplateRequest,
        insecure: bool,
    ) -> QueryResult<Value> {
        let body = serde_json::to_vec(request).map_err(|e| QueryError::Serialize(e.to_string()))?;
        let url = format!("{}/{}/_search/template", self.config.base_url(), index);

        debug!(%url, template = %request.id, insecure, "executing search template");

        let response = self
            .http(insecure)
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| QueryError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%url, %status, "search template rejected");
            return Err(QueryError::Rejected {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| QueryError::Unreachable(e.to_string()))?;

        let doc: serde_json::Map<String, Value> = serde_json::from_slice(&bytes)
            .map_err(|e| QueryError::MalformedResponse(e.to_string()))?;

        Ok(Value::Object(doc))
    }

    /// GET the store's base URL with certificate validation disabled.
    ///
    /// Used by the readiness probe; any HTTP status is returned as-is.
    pub async fn ping(&self) -> QueryResult<StatusCode> {
        let response = self
            .insecure
            .get(self.config.base_url())
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| QueryError::Unreachable(e.to_string()))?;
        Ok(response.status())
    }
}

fn build_http_client(insecure: bool) -> QueryResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .danger_accept_invalid_certs(insecure)
        .build()
        .map_err(|e| QueryError::Client(e.to_string()))
}
