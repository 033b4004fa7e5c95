//! Document store connection settings.
//!
//! Read once at startup and shared read-only by every query and probe.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Connection settings for the document store.
#[derive(Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL, e.g. `https://opensearch:9200`.
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// On-disk layout: store settings live under a `[store]` table.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    store: StoreConfig,
}

impl StoreConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load the `[store]` table from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.store)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
