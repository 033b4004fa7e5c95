//! Search template parameter decoding.
//!
//! Parameters arrive as a single flat string, `key1:val1;key2:val2`.

use std::collections::BTreeMap;

use crate::error::{QueryError, QueryResult};

/// Decode a `;`-separated list of `key:value` pairs.
///
/// An empty string yields no parameters. Each pair must split on `:`
/// into exactly two parts. Duplicate keys are not rejected: the last
/// occurrence wins.
pub fn parse_params(raw: &str) -> QueryResult<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    if raw.is_empty() {
        return Ok(params);
    }

    for pair in raw.split(';') {
        let mut parts = pair.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => {
                params.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(QueryError::MalformedInput {
                    pair: pair.to_string(),
                });
            }
        }
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_pairs() {
        let params = parse_params("key1:val1;key2:val2").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["key1"], "val1");
        assert_eq!(params["key2"], "val2");
    }

    #[test]
    fn empty_input_is_no_parameters() {
        assert!(parse_params("").unwrap().is_empty());
    }

    #[test]
    fn pair_without_colon_is_malformed() {
        let err = parse_params("badpair").unwrap_err();
        assert!(matches!(err, QueryError::MalformedInput { ref pair } if pair == "badpair"));
    }

    #[test]
    fn pair_with_two_colons_is_malformed() {
        let err = parse_params("a:b;c:d:e").unwrap_err();
        assert!(matches!(err, QueryError::MalformedInput { ref pair } if pair == "c:d:e"));
    }

    #[test]
    fn trailing_separator_is_malformed() {
        assert!(parse_params("a:b;").is_err());
    }

    #[test]
    fn last_duplicate_wins() {
        let params = parse_params("env:dev;env:prod").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params["env"], "prod");
    }

    #[test]
    fn empty_value_is_kept() {
        let params = parse_params("status:").unwrap();
        assert_eq!(params["status"], "");
    }
}
