//! searchscale-query — turns a stored search template into a scaling signal.
//!
//! # Architecture
//!
//! ```text
//! HttpSignalSource::fetch_signal(SignalQuery)
//!   ├── parse_params("k1:v1;k2:v2")          → template params
//!   ├── StoreClient::search_template()       → GET {url}/{index}/_search/template
//!   └── extract_signal(doc, "a.b.c")         → i64
//! ```
//!
//! Every failure carries an [`ErrorKind`] (`InvalidArgument`, `NotFound`,
//! `Internal`) so callers can report it without inspecting messages.

pub mod client;
pub mod config;
pub mod error;
pub mod params;
pub mod projector;
pub mod source;

pub use client::{REQUEST_TIMEOUT, SearchTemplateRequest, StoreClient};
pub use config::StoreConfig;
pub use error::{ErrorKind, QueryError, QueryResult};
pub use params::parse_params;
pub use projector::extract_signal;
pub use source::{HttpSignalSource, SignalQuery, SignalSource};
