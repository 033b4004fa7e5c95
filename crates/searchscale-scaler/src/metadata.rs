//! Scaler metadata parsing.
//!
//! KEDA passes the `metadata` block of a ScaledObject's trigger as a flat
//! string map. This module turns it into a typed [`ScalerMetadata`].

use std::collections::HashMap;

use searchscale_query::SignalQuery;
use thiserror::Error;
use tonic::Status;

pub const INDEX: &str = "index";
pub const SEARCH_TEMPLATE_NAME: &str = "searchTemplateName";
pub const PARAMETERS: &str = "parameters";
pub const VALUE_LOCATION: &str = "valueLocation";
pub const UNSAFE_SSL: &str = "unsafeSSL";
pub const ACTIVATION_TARGET_VALUE: &str = "activationTargetValue";
pub const TARGET_VALUE: &str = "targetValue";

pub const DEFAULT_ACTIVATION_TARGET_VALUE: i64 = 0;
pub const DEFAULT_TARGET_VALUE: i64 = 50;

/// Errors in caller-supplied metadata. Always reported as `InvalidArgument`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("index, searchTemplateName, parameters and valueLocation must be specified")]
    MissingFields,

    #[error("unsafeSSL must be either true or false, got {0:?}")]
    InvalidUnsafeSsl(String),
}

impl From<MetadataError> for Status {
    fn from(err: MetadataError) -> Self {
        Status::invalid_argument(err.to_string())
    }
}

/// Validated metadata for the querying operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalerMetadata {
    pub query: SignalQuery,
    /// The workload is active while the signal is strictly above this.
    pub activation_target_value: i64,
}

impl ScalerMetadata {
    /// Validate and parse metadata for `IsActive`, `GetMetrics` and
    /// `StreamIsActive`.
    pub fn parse(metadata: &HashMap<String, String>) -> Result<Self, MetadataError> {
        let unsafe_ssl = match metadata.get(UNSAFE_SSL) {
            None => false,
            Some(raw) => match raw.to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => return Err(MetadataError::InvalidUnsafeSsl(raw.clone())),
            },
        };

        let required = |key: &str| -> Result<String, MetadataError> {
            match metadata.get(key) {
                Some(value) if !value.is_empty() => Ok(value.clone()),
                _ => Err(MetadataError::MissingFields),
            }
        };

        let query = SignalQuery {
            index: required(INDEX)?,
            template: required(SEARCH_TEMPLATE_NAME)?,
            parameters: required(PARAMETERS)?,
            value_location: required(VALUE_LOCATION)?,
            unsafe_ssl,
        };

        // Unparsable values fall back to the default instead of failing.
        let activation_target_value = metadata
            .get(ACTIVATION_TARGET_VALUE)
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(DEFAULT_ACTIVATION_TARGET_VALUE);

        Ok(Self {
            query,
            activation_target_value,
        })
    }

    pub fn is_active(&self, signal: i64) -> bool {
        signal > self.activation_target_value
    }
}

/// Target size for `GetMetricSpec`; absent or unparsable values give 50.
pub fn target_value(metadata: &HashMap<String, String>) -> i64 {
    metadata
        .get(TARGET_VALUE)
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TARGET_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> HashMap<String, String> {
        HashMap::from([
            (INDEX.to_string(), "jobs".to_string()),
            (SEARCH_TEMPLATE_NAME.to_string(), "pending-jobs".to_string()),
            (PARAMETERS.to_string(), "service:billing".to_string()),
            (VALUE_LOCATION.to_string(), "hits.total.value".to_string()),
        ])
    }

    #[test]
    fn parses_required_fields_with_defaults() {
        let meta = ScalerMetadata::parse(&full()).unwrap();
        assert_eq!(meta.query.index, "jobs");
        assert_eq!(meta.query.template, "pending-jobs");
        assert_eq!(meta.query.parameters, "service:billing");
        assert_eq!(meta.query.value_location, "hits.total.value");
        assert!(!meta.query.unsafe_ssl);
        assert_eq!(meta.activation_target_value, 0);
    }

    #[test]
    fn each_required_field_is_checked() {
        for key in [INDEX, SEARCH_TEMPLATE_NAME, PARAMETERS, VALUE_LOCATION] {
            let mut missing = full();
            missing.remove(key);
            assert_eq!(ScalerMetadata::parse(&missing), Err(MetadataError::MissingFields), "{key}");

            let mut empty = full();
            empty.insert(key.to_string(), String::new());
            assert_eq!(ScalerMetadata::parse(&empty), Err(MetadataError::MissingFields), "{key}");
        }
    }

    #[test]
    fn unsafe_ssl_is_case_insensitive() {
        let mut meta = full();
        meta.insert(UNSAFE_SSL.to_string(), "TRUE".to_string());
        assert!(ScalerMetadata::parse(&meta).unwrap().query.unsafe_ssl);

        meta.insert(UNSAFE_SSL.to_string(), "False".to_string());
        assert!(!ScalerMetadata::parse(&meta).unwrap().query.unsafe_ssl);
    }

    #[test]
    fn unsafe_ssl_rejects_other_values() {
        let mut meta = full();
        meta.insert(UNSAFE_SSL.to_string(), "yes".to_string());
        assert_eq!(
            ScalerMetadata::parse(&meta),
            Err(MetadataError::InvalidUnsafeSsl("yes".to_string()))
        );

        meta.insert(UNSAFE_SSL.to_string(), String::new());
        assert!(matches!(
            ScalerMetadata::parse(&meta),
            Err(MetadataError::InvalidUnsafeSsl(_))
        ));
    }

    #[test]
    fn activation_target_value_parses_or_defaults() {
        let mut meta = full();
        meta.insert(ACTIVATION_TARGET_VALUE.to_string(), "5".to_string());
        assert_eq!(ScalerMetadata::parse(&meta).unwrap().activation_target_value, 5);

        meta.insert(ACTIVATION_TARGET_VALUE.to_string(), "five".to_string());
        assert_eq!(ScalerMetadata::parse(&meta).unwrap().activation_target_value, 0);
    }

    #[test]
    fn activation_is_strictly_greater() {
        let mut meta = full();
        meta.insert(ACTIVATION_TARGET_VALUE.to_string(), "5".to_string());
        let meta = ScalerMetadata::parse(&meta).unwrap();
        assert!(meta.is_active(10));
        assert!(!meta.is_active(5));
        assert!(!meta.is_active(4));
    }

    #[test]
    fn metadata_errors_are_invalid_argument() {
        let status = Status::from(MetadataError::MissingFields);
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn target_value_defaults() {
        assert_eq!(target_value(&HashMap::new()), 50);

        let meta = HashMap::from([(TARGET_VALUE.to_string(), "abc".to_string())]);
        assert_eq!(target_value(&meta), 50);

        let meta = HashMap::from([(TARGET_VALUE.to_string(), "200".to_string())]);
        assert_eq!(target_value(&meta), 200);
    }
}
