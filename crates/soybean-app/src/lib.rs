#![warn(missing_docs)]
//! # soybean-app
//!
//! ## Purpose
//! Orchestrates auth, API calls, and view state for `soybean-client`.
//!
//! ## Responsibilities
//! - Run every user action through [`ViewController`], one network round
//!   trip at a time, and fold the outcome into view state.
//! - Enforce the login gate in front of the predict and history tabs.
//! - Resolve configuration and expose the build version.
//! - Parse and execute terminal shell commands.
//! - Provide log redaction for free text that may hold secrets.
//!
//! ## Data flow
//! Shell line -> [`shell::parse_command`] -> [`shell::execute`] ->
//! [`ViewController`] operation -> `soybean-auth` / `soybean-api` ->
//! `soybean-ui` state -> rendered text.
//!
//! ## Ownership and lifetimes
//! The controller owns the session and all view state. History loading lends
//! the API client to two scoped threads and joins both before mutating state.
//!
//! ## Error model
//! Operations return [`AppError`] after writing the user-facing message into
//! the matching form, so callers may log the error and otherwise ignore it.
//!
//! ## Security and privacy notes
//! - Predict and history calls are refused locally without a session.
//! - Log redaction helpers strip token/credential strings.

pub mod config;
pub mod controller;
pub mod shell;

use soybean_api::ApiError;
use soybean_auth::AuthError;
use soybean_core::CoreError;
use soybean_ui::Tab;
use thiserror::Error;

pub use config::{API_BASE_URL_ENV, AppConfig, ConfigSource};
pub use controller::{ViewController, load_image};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SOYBEAN_CLIENT_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Redacts common secret markers in log-safe output.
///
/// Everything after the first marker is replaced, so values that follow it on
/// the same line never reach the log.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for key in ["password", "token", "authorization", "bearer"] {
        redacted = redact_key_value(&redacted, key);
    }
    redacted
}

fn redact_key_value(input: &str, key: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if let Some(position) = lower.find(key) {
        let prefix = &input[..position];
        return format!("{prefix}{key}=<redacted>");
    }

    input.to_string()
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Auth subsystem error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    /// API call error.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    /// Data model error.
    #[error("data error: {0}")]
    Core(#[from] CoreError),
    /// Action needs a session and none exists.
    #[error("not logged in")]
    NotLoggedIn,
    /// Predict was requested without an image.
    #[error("no image selected")]
    NoImageSelected,
    /// Feedback was requested before any prediction.
    #[error("no prediction to rate")]
    NoPrediction,
    /// Tab cannot be selected in the current state.
    #[error("{0:?} tab is not available")]
    TabUnavailable(Tab),
    /// Image file could not be read.
    #[error("cannot read image '{path}': {source}")]
    ImageRead {
        /// Path as given.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
}
