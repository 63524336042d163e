//! The view controller: session, view state, and one method per user action.

use std::path::Path;
use std::thread;

use soybean_api::{ApiClient, ApiError};
use soybean_auth::{AuthClient, AuthError, AuthStateMachine, Credentials, signup_request};
use soybean_core::{FeedbackRequest, HealthStatus, ImageUpload, User};
use soybean_ui::{FeedbackForm, LoginForm, SignupForm, Tab, UiState, render};
use tracing::{debug, info, warn};

use crate::{AppError, app_version};

/// Shown after a successful sign-up.
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful. You can now log in.";
/// Shown when `/me` fails after a token was issued.
pub const PROFILE_FAILURE_MESSAGE: &str = "Logged in but failed to fetch user info.";
/// Shown when predict is submitted without an image.
pub const NO_IMAGE_MESSAGE: &str = "Please choose an image.";
/// Shown when an authenticated action runs without a session.
pub const NOT_LOGGED_IN_MESSAGE: &str = "Please log in first.";
/// Shown after a successful prediction.
pub const PREDICTION_COMPLETE_MESSAGE: &str = "Prediction complete!";
/// Shown when feedback is submitted before any prediction.
pub const NO_PREDICTION_MESSAGE: &str = "Run a prediction first.";
/// Shown after feedback is accepted.
pub const FEEDBACK_SUCCESS_MESSAGE: &str = "Feedback submitted. Thank you!";

/// Holds session and view state and runs user actions against the API.
pub struct ViewController {
    api: ApiClient,
    auth_client: AuthClient,
    auth: AuthStateMachine,
    ui: UiState,
}

impl ViewController {
    /// Creates a logged-out controller on the auth tab.
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth_client: AuthClient::new(api.clone()),
            api,
            auth: AuthStateMachine::new(),
            ui: UiState::new(app_version()),
        }
    }

    /// Current view state.
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Current auth state.
    pub fn auth(&self) -> &AuthStateMachine {
        &self.auth
    }

    /// Active tab.
    pub fn tab(&self) -> Tab {
        self.ui.tab
    }

    /// Bearer token, when logged in.
    pub fn token(&self) -> Option<&str> {
        self.auth.access_token()
    }

    /// Logged-in account.
    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    /// Renders the current view.
    pub fn render(&self) -> String {
        render(&self.ui, self.auth.user(), self.auth.access_token().is_some())
    }

    /// Mutable sign-up form.
    pub fn signup_form_mut(&mut self) -> &mut SignupForm {
        &mut self.ui.signup
    }

    /// Mutable login form.
    pub fn login_form_mut(&mut self) -> &mut LoginForm {
        &mut self.ui.login
    }

    /// Mutable feedback form.
    pub fn feedback_form_mut(&mut self) -> &mut FeedbackForm {
        &mut self.ui.feedback
    }

    /// Replaces the selected image; `None` clears it.
    pub fn select_image(&mut self, upload: Option<ImageUpload>) {
        if let Some(released) = self.ui.predict.select_file(upload) {
            debug!(stage = "predict", action = "preview_released", preview = %released.id);
        }
        if let Some(preview) = &self.ui.predict.preview {
            info!(
                stage = "predict",
                action = "image_selected",
                preview = %preview.id,
                size_bytes = preview.size_bytes
            );
        }
    }

    /// Switches tabs.
    ///
    /// Logged-in tabs need a session; selecting history also reloads it. The
    /// auth tab is reached through [`Self::log_out`] while logged in.
    ///
    /// # Errors
    /// Returns [`AppError::NotLoggedIn`] or [`AppError::TabUnavailable`]
    /// without changing the tab.
    pub fn select_tab(&mut self, tab: Tab) -> Result<(), AppError> {
        match tab {
            Tab::Auth if self.auth.is_authenticated() => Err(AppError::TabUnavailable(tab)),
            Tab::Auth => {
                self.ui.tab = Tab::Auth;
                Ok(())
            }
            Tab::Predict | Tab::History if !self.auth.is_authenticated() => {
                Err(AppError::NotLoggedIn)
            }
            Tab::Predict => {
                self.ui.tab = Tab::Predict;
                Ok(())
            }
            Tab::History => {
                self.ui.tab = Tab::History;
                self.load_history()
            }
        }
    }

    /// Creates an account from the sign-up form.
    ///
    /// On success the form is cleared.
    ///
    /// # Errors
    /// Returns the blank-field or API error after setting the auth message.
    pub fn sign_up(&mut self) -> Result<(), AppError> {
        self.ui.message = None;
        let form = &self.ui.signup;
        let result = signup_request(&form.name, &form.email, &form.password)
            .and_then(|user| self.auth_client.signup(&user));

        match result {
            Ok(()) => {
                self.ui.message = Some(SIGNUP_SUCCESS_MESSAGE.to_string());
                self.ui.signup.clear();
                Ok(())
            }
            Err(error) => {
                self.ui.message = Some(format!("Signup failed: {error}"));
                Err(error.into())
            }
        }
    }

    /// Logs in with the login form and switches to the predict tab.
    ///
    /// Token and user are stored together only after both calls succeed; on
    /// any failure the controller stays logged out on the auth tab.
    ///
    /// # Errors
    /// Returns the auth error after setting the auth message.
    pub fn log_in(&mut self) -> Result<(), AppError> {
        self.ui.message = None;
        let credentials = Credentials::new(
            self.ui.login.email.clone(),
            self.ui.login.password.clone(),
        );

        match self.auth_client.login(&credentials) {
            Ok(session) => {
                self.auth.on_login_success(session);
                self.ui.login.password.clear();
                self.ui.tab = Tab::Predict;
                Ok(())
            }
            Err(error) => {
                self.auth.logout();
                self.ui.message = Some(match &error {
                    AuthError::Profile(_) => PROFILE_FAILURE_MESSAGE.to_string(),
                    other => format!("Login failed: {other}"),
                });
                Err(error.into())
            }
        }
    }

    /// Drops the session and every cached record, then shows the auth tab.
    pub fn log_out(&mut self) {
        self.auth.logout();
        self.ui.reset_session_views();
        info!(stage = "auth", action = "logout");
    }

    /// Uploads the selected image for classification.
    ///
    /// # Errors
    /// Returns [`AppError::NoImageSelected`] or [`AppError::NotLoggedIn`]
    /// without any network call, or the API error; each after setting the
    /// predict message.
    pub fn run_prediction(&mut self) -> Result<(), AppError> {
        self.ui.predict.message = None;
        self.ui.feedback.message = None;

        let Some(upload) = self.ui.predict.file.clone() else {
            self.ui.predict.message = Some(NO_IMAGE_MESSAGE.to_string());
            return Err(AppError::NoImageSelected);
        };
        let Some(token) = self.auth.access_token() else {
            self.ui.predict.message = Some(NOT_LOGGED_IN_MESSAGE.to_string());
            return Err(AppError::NotLoggedIn);
        };

        info!(
            stage = "predict",
            action = "submit",
            image_sha256 = %upload.digest_hex(),
            size_bytes = upload.len()
        );
        match self.api.predict(token, &upload) {
            Ok(prediction) => {
                info!(
                    stage = "predict",
                    action = "complete",
                    prediction_id = prediction.id,
                    label = %prediction.predicted_label
                );
                self.ui.predict.prediction = Some(prediction);
                self.ui.predict.message = Some(PREDICTION_COMPLETE_MESSAGE.to_string());
                Ok(())
            }
            Err(error) => {
                self.ui.predict.message = Some(format!("Prediction failed: {error}"));
                Err(error.into())
            }
        }
    }

    /// Sends the feedback form for the current prediction.
    ///
    /// # Errors
    /// Returns [`AppError::NoPrediction`] or [`AppError::NotLoggedIn`]
    /// without any network call, or the API error; each after setting the
    /// feedback message.
    pub fn submit_feedback(&mut self) -> Result<(), AppError> {
        let Some(prediction_id) = self.ui.predict.prediction.as_ref().map(|p| p.id) else {
            self.ui.feedback.message = Some(NO_PREDICTION_MESSAGE.to_string());
            return Err(AppError::NoPrediction);
        };
        let Some(token) = self.auth.access_token() else {
            self.ui.feedback.message = Some(NOT_LOGGED_IN_MESSAGE.to_string());
            return Err(AppError::NotLoggedIn);
        };

        let form = &self.ui.feedback;
        let request = FeedbackRequest {
            prediction_id,
            rating: Some(form.rating),
            is_correct: Some(form.is_correct),
            comment: form.comment_or_none(),
        };

        match self.api.submit_feedback(token, &request) {
            Ok(()) => {
                info!(stage = "feedback", action = "submitted", prediction_id);
                self.ui.feedback.message = Some(FEEDBACK_SUCCESS_MESSAGE.to_string());
                Ok(())
            }
            Err(error) => {
                self.ui.feedback.message = Some(format!("Feedback failed: {error}"));
                Err(error.into())
            }
        }
    }

    /// Reloads the user's predictions and feedback.
    ///
    /// Both lists are fetched concurrently and independently; a failed list
    /// becomes empty while the other still loads. History is marked loaded
    /// once both calls resolve.
    ///
    /// # Errors
    /// Returns [`AppError::NotLoggedIn`] without any network call.
    pub fn load_history(&mut self) -> Result<(), AppError> {
        let Some(token) = self.auth.access_token() else {
            return Err(AppError::NotLoggedIn);
        };
        let token = token.to_string();
        self.ui.history.loaded = false;

        let api = &self.api;
        let (predictions, feedback) = thread::scope(|scope| {
            let predictions = scope.spawn(|| api.list_predictions(&token));
            let feedback = scope.spawn(|| api.list_feedback(&token));
            (
                predictions.join().unwrap_or_else(|_| Err(worker_panicked())),
                feedback.join().unwrap_or_else(|_| Err(worker_panicked())),
            )
        });

        self.ui.history.predictions = predictions.unwrap_or_else(|error| {
            warn!(stage = "history", action = "predictions_failed", %error);
            Vec::new()
        });
        self.ui.history.feedback = feedback.unwrap_or_else(|error| {
            warn!(stage = "history", action = "feedback_failed", %error);
            Vec::new()
        });
        self.ui.history.loaded = true;

        info!(
            stage = "history",
            action = "loaded",
            predictions = self.ui.history.predictions.len(),
            feedback = self.ui.history.feedback.len()
        );
        Ok(())
    }

    /// Asks the API whether it is up.
    ///
    /// # Errors
    /// Propagates the API error.
    pub fn health(&self) -> Result<HealthStatus, AppError> {
        Ok(self.api.health()?)
    }
}

fn worker_panicked() -> ApiError {
    ApiError::Transport("history worker panicked".to_string())
}

/// Reads an image file into an upload.
///
/// # Errors
/// Returns [`AppError::ImageRead`] when the file cannot be read and
/// [`AppError::Core`] when it is empty.
pub fn load_image(path: &Path) -> Result<ImageUpload, AppError> {
    let bytes = std::fs::read(path).map_err(|source| AppError::ImageRead {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImageUpload::new(file_name, bytes)?)
}
