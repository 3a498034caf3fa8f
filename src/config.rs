use crate::adapters::outbound::{DEFAULT_ENDPOINT, DEFAULT_MAX_ROWS};
use crate::domain::value_objects::Locale;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Geonames account
    pub username: Option<String>,
    pub locale: Option<String>,

    // Request settings
    pub endpoint: String,
    pub max_rows: usize,
    pub http_timeout_secs: u64,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            locale: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            http_timeout_secs: 10,
            debug: false,
        }
    }
}

impl Config {
    /// Parsed locale, if one is configured.
    pub fn locale(&self) -> Option<Locale> {
        self.locale.as_deref().and_then(Locale::parse)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ConfigError::MissingUsername);
        }
        if self.max_rows == 0 {
            return Err(ConfigError::InvalidMaxRows);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("GEONAMES_USERNAME is required")]
    MissingUsername,
    #[error("max_rows must be at least 1")]
    InvalidMaxRows,
}

pub fn load_config() -> anyhow::Result<Config> {
    let username = std::env::var("GEONAMES_USERNAME").ok();

    let locale = std::env::var("GEONAMES_LOCALE").ok();

    let endpoint = std::env::var("GEONAMES_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

    let max_rows = std::env::var("GEONAMES_MAX_ROWS")
        .unwrap_or_else(|_| DEFAULT_MAX_ROWS.to_string())
        .parse()
        .unwrap_or(DEFAULT_MAX_ROWS);

    let http_timeout_secs = std::env::var("GEONAMES_HTTP_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        username,
        locale,
        endpoint,
        max_rows,
        http_timeout_secs,
        debug,
    })
}
