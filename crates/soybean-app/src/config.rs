//! Runtime configuration.
//!
//! The API base URL comes from the command line, then
//! `SOYBEAN_API_BASE_URL`, then [`DEFAULT_API_BASE_URL`].

use soybean_api::{DEFAULT_API_BASE_URL, validate_base_url};
use tracing::info;

use crate::AppError;

/// Environment variable holding the API base URL.
pub const API_BASE_URL_ENV: &str = "SOYBEAN_API_BASE_URL";

/// Where the base URL was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--api-base-url` flag.
    Flag,
    /// [`API_BASE_URL_ENV`].
    Env,
    /// Built-in default.
    Default,
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Normalized API base URL without a trailing slash.
    pub api_base_url: String,
    /// Origin of `api_base_url`.
    pub source: ConfigSource,
}

impl AppConfig {
    /// Resolves configuration from a flag value and the process environment.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the chosen URL is invalid.
    pub fn resolve(flag: Option<&str>) -> Result<Self, AppError> {
        let env_value = std::env::var(API_BASE_URL_ENV).ok();
        Self::from_sources(flag, env_value.as_deref())
    }

    /// Resolves configuration from explicit sources; blank values are skipped.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the chosen URL is invalid.
    pub fn from_sources(flag: Option<&str>, env_value: Option<&str>) -> Result<Self, AppError> {
        let (raw, source) = if let Some(value) = non_blank(flag) {
            (value.to_string(), ConfigSource::Flag)
        } else if let Some(value) = non_blank(env_value) {
            (value.to_string(), ConfigSource::Env)
        } else {
            info!("{API_BASE_URL_ENV} not set, using default: {DEFAULT_API_BASE_URL}");
            (DEFAULT_API_BASE_URL.to_string(), ConfigSource::Default)
        };

        let api_base_url =
            validate_base_url(&raw).map_err(|error| AppError::Config(error.to_string()))?;

        Ok(Self {
            api_base_url,
            source,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
