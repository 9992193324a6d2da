use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use thiserror::Error;

use crate::api_connection::connection::FdcClientConfig;
use crate::api_connection::endpoints::DEFAULT_FDC_BASE_URL;
use crate::api_connection::rate_limiter::RateLimiter;

pub const USDA_API_KEY_VAR: &str = "USDA_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value '{value}' for {var}")]
    Invalid { var: &'static str, value: String },
    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenv::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub usda_api_key: String,
    pub usda_base_url: String,
    pub request_timeout: Duration,
    pub max_cache_size: usize,
    pub default_page_size: u32,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
    pub log_level: String,
}

impl Settings {
    /// Reads the process environment after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads a dotenv-format file into the process environment, then reads it.
    ///
    /// Variables already set in the environment keep their values.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        dotenv::from_path(path)?;
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let usda_api_key = lookup(USDA_API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::Missing(USDA_API_KEY_VAR))?;

        Ok(Self {
            usda_api_key,
            usda_base_url: lookup("USDA_BASE_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FDC_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?),
            max_cache_size: parse_or(&lookup, "MAX_CACHE_SIZE", 1024)?,
            default_page_size: parse_or(&lookup, "DEFAULT_PAGE_SIZE", 25)?,
            rate_limit_max_requests: parse_or(&lookup, "RATE_LIMIT_MAX_REQUESTS", 1000)?,
            rate_limit_window: Duration::from_secs(parse_or(
                &lookup,
                "RATE_LIMIT_WINDOW_SECS",
                3600,
            )?),
            log_level: lookup("LOG_LEVEL")
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn fdc_client_config(&self) -> FdcClientConfig {
        FdcClientConfig {
            api_key: self.usda_api_key.clone(),
            base_url: self.usda_base_url.clone(),
            timeout: self.request_timeout,
            cache_size: self.max_cache_size,
        }
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.rate_limit_max_requests, self.rate_limit_window)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                var,
                value: raw.clone(),
            }),
    }
}
