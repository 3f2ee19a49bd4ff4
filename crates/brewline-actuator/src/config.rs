// SPDX-License-Identifier: BUSL-1.1
//! Hopster client configuration.
//!
//! Loaded from environment variables, or built explicitly for tests and
//! local stubs.

use url::Url;

/// Configuration for connecting to the Hopster equipment service.
///
/// Custom `Debug` implementation redacts the `api_key` field.
#[derive(Clone)]
pub struct ActuatorConfig {
    /// Base URL of the Hopster service.
    pub base_url: Url,
    /// Value of the `apikey` request header.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ActuatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ActuatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `HOPSTER_BASE_URL` (required)
    /// - `HOPSTER_API_KEY` (required)
    /// - `HOPSTER_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url =
            std::env::var("HOPSTER_BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        let api_key = std::env::var("HOPSTER_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;

        Ok(Self {
            base_url: parse_url("HOPSTER_BASE_URL", &raw_url)?,
            api_key,
            timeout_secs: std::env::var("HOPSTER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Build a configuration from an explicit base URL.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            api_key: api_key.into(),
            timeout_secs: 30,
        })
    }

    /// Configuration pointing at a stub on localhost.
    pub fn local(port: u16, api_key: &str) -> Result<Self, ConfigError> {
        let mut config = Self::new(&format!("http://127.0.0.1:{port}"), api_key)?;
        config.timeout_secs = 5;
        Ok(config)
    }
}

fn parse_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            source.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HOPSTER_BASE_URL environment variable is required")]
    MissingBaseUrl,
    #[error("HOPSTER_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid API key characters")]
    InvalidApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_builds_valid_config() {
        let cfg = ActuatorConfig::local(9000, "test-key").unwrap();
        assert_eq!(cfg.api_key, "test-key");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = ActuatorConfig::local(9000, "super-secret").unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(matches!(
            ActuatorConfig::new("not a url", "k"),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(matches!(
            ActuatorConfig::new("mailto:brewer@example.com", "k"),
            Err(ConfigError::InvalidUrl(..))
        ));
    }
}
