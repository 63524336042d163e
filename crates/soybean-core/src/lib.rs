#![warn(missing_docs)]
//! # soybean-core
//!
//! ## Purpose
//! Defines the plain data model shared across the `soybean-client` workspace.
//!
//! ## Responsibilities
//! - Represent the API records the client caches (users, predictions,
//!   feedback) and the token issued at login.
//! - Parse response bodies into those records with contract checks.
//! - Hold selected images for upload and derive a stable content digest.
//!
//! ## Data flow
//! Transport returns raw body text -> [`parse_json`] and the typed wrappers
//! ([`parse_user`], [`parse_predictions`], ...) -> owned records stored by
//! the view controller.
//!
//! ## Ownership and lifetimes
//! Every record owns its strings so parsed values outlive the transient
//! response buffer they came from.
//!
//! ## Error model
//! Invalid JSON and contract violations (blank token) return
//! [`CoreError`] variants.
//!
//! ## Security and privacy notes
//! [`TokenResponse`] redacts its access token from `Debug` output. Image bytes
//! are never formatted; only their digest is exposed.
//!
//! ## Example
//! ```rust
//! use soybean_core::parse_prediction;
//!
//! let raw = r#"{"id":3,"image_url":"uploads/a.jpg","predicted_label":"rust",
//!     "confidence":0.91,"model_version":"v1","created_at":"2025-01-01T00:00:00"}"#;
//! let prediction = parse_prediction(raw).unwrap();
//! assert_eq!(prediction.predicted_label, "rust");
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Token type the login endpoint issues by default.
pub const DEFAULT_TOKEN_TYPE: &str = "bearer";

/// Account record returned by `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned numeric id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

/// One inference result for an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Server-assigned numeric id.
    pub id: i64,
    /// Where the service stored the uploaded image.
    pub image_url: String,
    /// Predicted disease label.
    pub predicted_label: String,
    /// Model confidence, when the model reports one.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Model version string, when the service reports one.
    #[serde(default)]
    pub model_version: Option<String>,
    /// Creation timestamp exactly as the API formats it.
    pub created_at: String,
}

/// Feedback a user left on one prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Server-assigned numeric id.
    pub id: i64,
    /// Author id.
    pub user_id: i64,
    /// Prediction the feedback refers to.
    pub prediction_id: i64,
    /// Rating as stored by the server; not range-checked on read.
    #[serde(default)]
    pub rating: Option<i64>,
    /// Whether the user judged the prediction correct.
    #[serde(default)]
    pub is_correct: Option<bool>,
    /// Free-form comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Creation timestamp exactly as the API formats it.
    pub created_at: String,
}

/// Body of `POST /users/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain password; the service hashes it.
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /feedback/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// Prediction being rated.
    pub prediction_id: i64,
    /// Rating in `1..=5`.
    pub rating: Option<u8>,
    /// Correctness verdict.
    pub is_correct: Option<bool>,
    /// Comment, `None` when the user left it blank.
    pub comment: Option<String>,
}

/// Body returned by `POST /login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque bearer token.
    pub access_token: String,
    /// Token scheme, normally `bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok` when the service is up.
    pub status: String,
}

impl HealthStatus {
    /// Returns `true` when the service reported `ok`.
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Image selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name sent in the multipart part.
    pub file_name: String,
    /// MIME type guessed from the file extension.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Creates an upload from a file name and its bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyImage`] when `bytes` is empty.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CoreError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(CoreError::EmptyImage(file_name));
        }

        let content_type = guess_image_content_type(&file_name).to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Hex-encoded SHA-256 of the image bytes.
    pub fn digest_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; construction rejects empty images.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Maps a file extension to an image MIME type.
///
/// Unknown extensions fall back to `application/octet-stream`; the service
/// decides whether it can read the file.
pub fn guess_image_content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Decodes a JSON body into `T`.
///
/// # Errors
/// Returns [`CoreError::Decode`] for malformed JSON or shape mismatch.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, CoreError> {
    serde_json::from_str(raw).map_err(CoreError::Decode)
}

/// Parses a login response.
///
/// # Errors
/// Returns [`CoreError::InvalidContract`] when the token is blank.
pub fn parse_token_response(raw: &str) -> Result<TokenResponse, CoreError> {
    let parsed: TokenResponse = parse_json(raw)?;
    if parsed.access_token.trim().is_empty() {
        return Err(CoreError::InvalidContract(
            "access_token is empty".to_string(),
        ));
    }
    Ok(parsed)
}

/// Parses a `GET /me` response.
pub fn parse_user(raw: &str) -> Result<User, CoreError> {
    parse_json(raw)
}

/// Parses a single prediction. The label is kept verbatim, even when blank.
pub fn parse_prediction(raw: &str) -> Result<Prediction, CoreError> {
    parse_json(raw)
}

/// Parses a prediction list.
pub fn parse_predictions(raw: &str) -> Result<Vec<Prediction>, CoreError> {
    parse_json(raw)
}

/// Parses a feedback list.
pub fn parse_feedback_list(raw: &str) -> Result<Vec<Feedback>, CoreError> {
    parse_json(raw)
}

/// Data model errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON decode failure.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed body violates the API contract.
    #[error("response contract violation: {0}")]
    InvalidContract(String),
    /// Selected image has no bytes.
    #[error("image '{0}' is empty")]
    EmptyImage(String),
}
