//! Client configuration.
//!
//! Loaded from an optional TOML file and `HOLIDAZE_*` environment variables
//! (`HOLIDAZE_BASE_URL`, `HOLIDAZE_API_KEY`, `HOLIDAZE_PAGE_SIZE`,
//! `HOLIDAZE_SEARCH_BATCH_SIZE`), then validated.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::Result;

/// Settings shared by every request the client builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the Holidaze API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Static key sent as `X-Noroff-API-Key` on every request.
    #[serde(default)]
    pub api_key: String,
    /// Venues per page in paged mode.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// How many venues a search fetches before filtering locally.
    #[serde(default = "default_search_batch_size")]
    pub search_batch_size: u32,
}

fn default_base_url() -> String {
    "https://api.noroff.dev/api/v1/holidaze".to_string()
}

fn default_page_size() -> u32 {
    12
}

fn default_search_batch_size() -> u32 {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            page_size: default_page_size(),
            search_batch_size: default_search_batch_size(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            ..Self::default()
        }
    }

    /// Load from the environment only.
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load from `path` (if it exists) with environment overrides on top.
    pub fn load_from_path(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("HOLIDAZE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ClientConfig = builder
            .build()
            .and_then(|settings| settings.try_deserialize::<ClientConfig>())
            .map_err(|e| ApiError::config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config(
                "base URL must be a valid HTTP or HTTPS URL",
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(ApiError::config("API key cannot be empty"));
        }
        if !(1..=100).contains(&self.page_size) {
            return Err(ApiError::config("page size must be between 1 and 100"));
        }
        if !(1..=100).contains(&self.search_batch_size) {
            return Err(ApiError::config(
                "search batch size must be between 1 and 100",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_listing_behaviour() {
        let config = ClientConfig::default();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.search_batch_size, 100);
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = ClientConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let config = ClientConfig::new("ftp://example.com", "key");
        assert!(config.validate().is_err());
    }

    #[test]
    fn page_size_out_of_range_is_rejected() {
        let mut config = ClientConfig::new("http://localhost", "key");
        config.page_size = 0;
        assert!(config.validate().is_err());
        config.page_size = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("holidaze-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("client.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "base_url = \"http://localhost:4000\"\napi_key = \"file-key\"\npage_size = 6"
        )
        .unwrap();

        let config = ClientConfig::load_from_path(Some(&path)).unwrap();
        assert_eq!(config.base_url, "http://localhost:4000");
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.page_size, 6);
        assert_eq!(config.search_batch_size, 100);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
