#![warn(missing_docs)]
//! # soybean-auth
//!
//! ## Purpose
//! Implements account creation, login, and in-memory session handling for
//! `soybean-client`.
//!
//! ## Responsibilities
//! - Presence-check sign-up and login inputs before any network call.
//! - Run the two-step login flow: token issuance, then profile fetch.
//! - Model the session as an explicit state machine that gates logged-in
//!   views.
//!
//! ## Data flow
//! Form fields -> [`Credentials`] / [`signup_request`] -> [`AuthClient`] calls
//! `/login` then `/me` through `soybean-api` -> [`Session`] ->
//! [`AuthStateMachine`].
//!
//! ## Ownership and lifetimes
//! Sessions own their token and user record; the state machine owns the
//! current session outright so logout is a plain overwrite.
//!
//! ## Error model
//! Blank inputs yield [`AuthError::EmptyCredential`] or
//! [`AuthError::MissingField`]. Failures of the token step and the profile
//! step are kept apart so the UI can tell them apart.
//!
//! ## Security and privacy notes
//! Passwords and tokens are redacted from `Debug` output and never logged.
//! Tokens live only in memory and are dropped on logout.
//!
//! ## Example
//! ```rust
//! use soybean_auth::{AuthState, AuthStateMachine};
//!
//! let machine = AuthStateMachine::new();
//! assert!(matches!(machine.state(), AuthState::Unauthenticated));
//! ```

use std::fmt;

use soybean_api::{ApiClient, ApiError};
use soybean_core::{DEFAULT_TOKEN_TYPE, NewUser, User};
use thiserror::Error;
use tracing::{info, warn};

/// User-provided login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email, sent as the `username` form field.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Builds credentials from raw form values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Builds a sign-up body, requiring every field to be present.
///
/// # Errors
/// Returns [`AuthError::MissingField`] naming the first blank field.
pub fn signup_request(
    name: &str,
    email: &str,
    password: &str,
) -> Result<NewUser, AuthError> {
    for (field, value) in [("name", name), ("email", email), ("password", password)] {
        if value.trim().is_empty() {
            return Err(AuthError::MissingField(field));
        }
    }

    Ok(NewUser {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

/// Bearer token issued by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Opaque token presented on authenticated calls.
    pub access_token: String,
    /// Token scheme reported by the server.
    pub token_type: String,
}

impl SessionToken {
    /// Wraps a raw bearer string.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Token plus the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token.
    pub token: SessionToken,
    /// Account fetched with the token.
    pub user: User,
}

/// Runtime authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No session exists.
    Unauthenticated,
    /// Token and user are both known.
    Authenticated(Session),
}

/// Auth state machine with explicit legal transitions.
///
/// There is no expiry transition: a token stays valid in the client until
/// logout, and the server rejects it if it no longer is.
#[derive(Debug, Clone)]
pub struct AuthStateMachine {
    state: AuthState,
}

impl AuthStateMachine {
    /// Creates a new state machine in `Unauthenticated` state.
    pub fn new() -> Self {
        Self {
            state: AuthState::Unauthenticated,
        }
    }

    /// Returns current auth state snapshot.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Applies login success transition.
    pub fn on_login_success(&mut self, session: Session) {
        self.state = AuthState::Authenticated(session);
    }

    /// Explicit logout transition.
    pub fn logout(&mut self) {
        self.state = AuthState::Unauthenticated;
    }

    /// Current session, when authenticated.
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            AuthState::Authenticated(session) => Some(session),
            AuthState::Unauthenticated => None,
        }
    }

    /// Bearer string for authenticated calls.
    pub fn access_token(&self) -> Option<&str> {
        self.session()
            .map(|session| session.token.access_token.as_str())
    }

    /// Logged-in account.
    pub fn user(&self) -> Option<&User> {
        self.session().map(|session| &session.user)
    }

    /// Returns `true` when both token and user are present.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }
}

impl Default for AuthStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Auth client running sign-up and login against the API.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    /// Wraps an API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Creates an account.
    ///
    /// # Errors
    /// Returns [`AuthError::Signup`] with the API failure.
    pub fn signup(&self, user: &NewUser) -> Result<(), AuthError> {
        info!(
            stage = "auth",
            action = "signup_attempt",
            email_len = user.email.len()
        );
        self.api.create_user(user).map_err(AuthError::Signup)?;
        info!(stage = "auth", action = "signup_success");
        Ok(())
    }

    /// Exchanges credentials for a token, then fetches the account with it.
    ///
    /// Nothing is returned unless both steps succeed, so callers never hold a
    /// token without its user.
    ///
    /// # Errors
    /// Returns [`AuthError::EmptyCredential`] for blank inputs,
    /// [`AuthError::Login`] when the token step fails, and
    /// [`AuthError::Profile`] when the profile step fails.
    pub fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if credentials.username.trim().is_empty() || credentials.password.trim().is_empty() {
            return Err(AuthError::EmptyCredential);
        }

        info!(
            stage = "auth",
            action = "login_attempt",
            username_len = credentials.username.trim().len()
        );

        let issued = self
            .api
            .login(credentials.username.trim(), &credentials.password)
            .map_err(AuthError::Login)?;
        let token = SessionToken {
            access_token: issued.access_token,
            token_type: issued.token_type,
        };

        let user = match self.api.current_user(&token.access_token) {
            Ok(user) => user,
            Err(error) => {
                warn!(stage = "auth", action = "profile_failed", %error);
                return Err(AuthError::Profile(error));
            }
        };

        info!(stage = "auth", action = "login_success", user_id = user.id);
        Ok(Session { token, user })
    }
}

/// Errors produced by auth client logic.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials are missing/blank.
    #[error("username and password must be non-empty")]
    EmptyCredential,
    /// A sign-up field is blank.
    #[error("{0} must be non-empty")]
    MissingField(&'static str),
    /// Account creation failed.
    #[error("{0}")]
    Signup(ApiError),
    /// Token request failed.
    #[error("{0}")]
    Login(ApiError),
    /// Token was issued but the account could not be fetched.
    #[error("failed to fetch user info: {0}")]
    Profile(ApiError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for input checks and state transitions.

    use super::*;

    fn session() -> Session {
        Session {
            token: SessionToken::bearer("token"),
            user: User {
                id: 1,
                name: "Ada".to_string(),
                email: "ada@example.test".to_string(),
            },
        }
    }

    #[test]
    fn signup_request_names_first_blank_field() {
        assert!(matches!(
            signup_request("Ada", " ", "pw"),
            Err(AuthError::MissingField("email"))
        ));
        let user = signup_request(" Ada ", "ada@example.test", "pw").expect("fields present");
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn logout_returns_to_unauthenticated() {
        let mut machine = AuthStateMachine::new();
        machine.on_login_success(session());
        assert_eq!(machine.access_token(), Some("token"));

        machine.logout();
        assert!(matches!(machine.state(), AuthState::Unauthenticated));
        assert!(machine.user().is_none());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = Credentials::new("ada", "hunter2");
        assert!(!format!("{credentials:?}").contains("hunter2"));
        assert!(!format!("{:?}", session()).contains("\"token\""));
    }
}
