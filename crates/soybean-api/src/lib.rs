#![warn(missing_docs)]
//! # soybean-api
//!
//! ## Purpose
//! Request/response plumbing between the client and the classification API.
//!
//! ## Responsibilities
//! - Validate the configured API base URL.
//! - Describe requests as transport-neutral [`ApiRequest`] values.
//! - Send them through an injectable [`ApiTransport`]; [`HttpTransport`] is
//!   the `reqwest` implementation.
//! - Map each endpoint of the API contract to a typed [`ApiClient`] method.
//!
//! ## Data flow
//! Controller -> [`ApiClient`] builds [`ApiRequest`] -> [`ApiTransport`]
//! returns [`ApiResponse`] -> status check -> `soybean-core` parsers -> typed
//! record.
//!
//! ## Ownership and lifetimes
//! Requests own their bodies so a transport can move them across threads.
//! Responses own the full body text.
//!
//! ## Error model
//! [`ApiError`] keeps the two failure classes the client distinguishes:
//! transport failure and non-2xx status. A non-2xx status renders as the
//! response body verbatim. No request is ever retried.
//!
//! ## Security and privacy notes
//! `Debug` output of requests hides bearer tokens, form values and image
//! bytes. Log lines carry method, path and status only.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde::Serialize;
use soybean_core::{
    CoreError, Feedback, FeedbackRequest, HealthStatus, ImageUpload, NewUser, Prediction,
    TokenResponse, User, parse_feedback_list, parse_json, parse_prediction, parse_predictions,
    parse_token_response, parse_user,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Default API base URL when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Multipart field name the predict endpoint reads the image from.
pub const PREDICT_FILE_FIELD: &str = "file";

/// HTTP method subset used by the API contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Request body variants.
#[derive(Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// Single-file multipart upload.
    Multipart {
        /// Form field name.
        field: String,
        /// File content.
        upload: ImageUpload,
    },
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Json(_) => f.write_str("Json(..)"),
            RequestBody::Form(fields) => {
                let keys: Vec<&str> = fields.iter().map(|(key, _)| key.as_str()).collect();
                f.debug_tuple("Form").field(&keys).finish()
            }
            RequestBody::Multipart { field, upload } => f
                .debug_struct("Multipart")
                .field("field", field)
                .field("upload", upload)
                .finish(),
        }
    }
}

/// Transport-neutral request description.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path appended to the base URL, starting with `/`.
    pub path: String,
    /// Bearer token for authenticated calls.
    pub bearer: Option<String>,
    /// Body payload.
    pub body: RequestBody,
}

impl ApiRequest {
    /// Unauthenticated `GET`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    /// Unauthenticated `POST` with `body`.
    pub fn post(path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            bearer: None,
            body,
        }
    }

    /// Attaches a bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body)
            .finish()
    }
}

/// Raw response: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

impl ApiResponse {
    /// Builds a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport used by [`ApiClient`].
pub trait ApiTransport: Send + Sync {
    /// Sends one request and returns whatever status the server produced.
    ///
    /// Only failures to get any response at all are errors here.
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Blocking `reqwest` transport bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds a transport for `base_url`.
    ///
    /// The client has no request timeout; a slow service simply keeps the
    /// action pending.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidBaseUrl`] for an unusable URL and
    /// [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("soybean-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| ApiError::Transport(format!("http client init failed: {error}")))?;

        Ok(Self { base_url, client })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ApiTransport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart { field, upload } => {
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.content_type)
                    .map_err(|error| ApiError::Transport(format!("invalid upload part: {error}")))?;
                builder.multipart(Form::new().part(field.clone(), part))
            }
        };

        let response = builder
            .send()
            .map_err(|error| ApiError::Transport(error.without_url().to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|error| ApiError::Transport(format!("failed to read response body: {error}")))?;

        Ok(ApiResponse { status, body })
    }
}

/// Typed client for every endpoint of the classification API.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
}

impl ApiClient {
    /// Wraps a transport.
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Builds a client over [`HttpTransport`].
    ///
    /// # Errors
    /// See [`HttpTransport::new`].
    pub fn http(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(HttpTransport::new(base_url)?)))
    }

    /// Sends `request` and returns the body of a 2xx response.
    ///
    /// # Errors
    /// Returns [`ApiError::Status`] for any non-2xx status, carrying the body
    /// text unchanged, and propagates transport errors.
    pub fn send(&self, request: ApiRequest) -> Result<String, ApiError> {
        debug!(
            stage = "api",
            action = "request",
            method = %request.method,
            path = %request.path,
            authenticated = request.bearer.is_some()
        );

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(error) => {
                warn!(stage = "api", action = "transport_failed", path = %request.path, %error);
                return Err(error);
            }
        };

        if !response.is_success() {
            info!(
                stage = "api",
                action = "rejected",
                path = %request.path,
                status = response.status
            );
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        debug!(stage = "api", action = "ok", path = %request.path, status = response.status);
        Ok(response.body)
    }

    /// `GET /health`.
    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        let body = self.send(ApiRequest::get("/health"))?;
        Ok(parse_json(&body)?)
    }

    /// `POST /users/`. The response body is not needed by the client.
    pub fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.send(ApiRequest::post("/users/", json_body(user)?))?;
        Ok(())
    }

    /// `POST /login` with form-encoded `username` and `password`.
    pub fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let body = RequestBody::Form(vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ]);
        let body = self.send(ApiRequest::post("/login", body))?;
        Ok(parse_token_response(&body)?)
    }

    /// `GET /me`.
    pub fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let body = self.send(ApiRequest::get("/me").with_bearer(token))?;
        Ok(parse_user(&body)?)
    }

    /// `POST /predict` with the image as multipart field `file`.
    pub fn predict(&self, token: &str, upload: &ImageUpload) -> Result<Prediction, ApiError> {
        let request = ApiRequest::post(
            "/predict",
            RequestBody::Multipart {
                field: PREDICT_FILE_FIELD.to_string(),
                upload: upload.clone(),
            },
        )
        .with_bearer(token);
        let body = self.send(request)?;
        Ok(parse_prediction(&body)?)
    }

    /// `POST /feedback/`.
    pub fn submit_feedback(&self, token: &str, feedback: &FeedbackRequest) -> Result<(), ApiError> {
        self.send(ApiRequest::post("/feedback/", json_body(feedback)?).with_bearer(token))?;
        Ok(())
    }

    /// `GET /predictions/me`.
    pub fn list_predictions(&self, token: &str) -> Result<Vec<Prediction>, ApiError> {
        let body = self.send(ApiRequest::get("/predictions/me").with_bearer(token))?;
        Ok(parse_predictions(&body)?)
    }

    /// `GET /feedback/me`.
    pub fn list_feedback(&self, token: &str) -> Result<Vec<Feedback>, ApiError> {
        let body = self.send(ApiRequest::get("/feedback/me").with_bearer(token))?;
        Ok(parse_feedback_list(&body)?)
    }
}

fn json_body<T: Serialize>(value: &T) -> Result<RequestBody, ApiError> {
    serde_json::to_value(value)
        .map(RequestBody::Json)
        .map_err(ApiError::Encode)
}

/// Validates and normalizes the API base URL.
///
/// Returns the URL without a trailing slash so paths can be appended as-is.
///
/// # Errors
/// Returns [`ApiError::InvalidBaseUrl`] when the URL does not parse, is not
/// `http`/`https`, or carries a query or fragment.
pub fn validate_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|error| ApiError::InvalidBaseUrl(format!("invalid api url: {error}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ApiError::InvalidBaseUrl(
            "api url must use http or https".to_string(),
        ));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ApiError::InvalidBaseUrl(
            "api url must not carry a query or fragment".to_string(),
        ));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// API call errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained.
    #[error("network error: {0}")]
    Transport(String),
    /// Server answered with a non-2xx status; displays the body verbatim.
    #[error("{body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },
    /// 2xx body did not match the expected record.
    #[error("unexpected response: {0}")]
    Decode(#[from] CoreError),
    /// Request body could not be serialized.
    #[error("request encode failure: {0}")]
    Encode(serde_json::Error),
    /// Configured base URL is unusable.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for base URL policy and status mapping.

    use std::sync::Mutex;

    use super::*;

    struct FixedTransport {
        response: ApiResponse,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl ApiTransport for FixedTransport {
        fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.seen
                .lock()
                .expect("request log lock should work")
                .push(request.clone());
            Ok(self.response.clone())
        }
    }

    #[test]
    fn validates_base_url_policy() {
        assert_eq!(
            validate_base_url("http://127.0.0.1:8000/").expect("url should pass"),
            "http://127.0.0.1:8000"
        );
        assert!(validate_base_url("https://api.example.test/v1").is_ok());
        assert!(validate_base_url("ftp://api.example.test").is_err());
        assert!(validate_base_url("http://api.example.test/?x=1").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn non_success_status_keeps_body_verbatim() {
        let client = ApiClient::new(Arc::new(FixedTransport {
            response: ApiResponse::new(400, r#"{"detail":"Email Already Registered"}"#),
            seen: Mutex::new(Vec::new()),
        }));

        let error = client
            .create_user(&NewUser {
                name: "Ada".to_string(),
                email: "ada@example.test".to_string(),
                password: "pw".to_string(),
            })
            .expect_err("400 should fail");

        assert!(matches!(error, ApiError::Status { status: 400, .. }));
        assert_eq!(error.to_string(), r#"{"detail":"Email Already Registered"}"#);
    }

    #[test]
    fn request_debug_hides_secrets() {
        let request = ApiRequest::post(
            "/login",
            RequestBody::Form(vec![("password".to_string(), "hunter2".to_string())]),
        )
        .with_bearer("tok-123");
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok-123"));
    }
}
