#![warn(missing_docs)]
//! # soybean-ui
//!
//! ## Purpose
//! Defines the view state of `soybean-client` and renders it as text.
//!
//! ## Responsibilities
//! - Hold the active tab, every form's field values, and per-form status
//!   messages.
//! - Track the selected image and its preview handle, releasing the previous
//!   preview whenever the selection changes.
//! - Cache the last prediction and the loaded history lists.
//! - Render the logged-out view, the predict panel and the history view.
//!
//! ## Data flow
//! Controller operations mutate [`UiState`]; [`render`] projects it, together
//! with the logged-in user, into the text the shell prints.
//!
//! ## Ownership and lifetimes
//! `UiState` owns every string and record so reducers can overwrite fields
//! without borrowing from responses.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Invalid inputs
//! (out-of-range ratings, unparsable numbers) are clamped.
//!
//! ## Security and privacy notes
//! UI state holds form passwords only until submit; rendering masks them.
//! Tokens never enter this crate.

use std::fmt::Write as _;

use soybean_core::{Feedback, ImageUpload, Prediction, User};

/// Lowest accepted feedback rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted feedback rating.
pub const MAX_RATING: u8 = 5;

/// Top-level view tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Sign-up and login forms.
    Auth,
    /// Image upload and prediction result.
    Predict,
    /// Past predictions and feedback.
    History,
}

impl Tab {
    /// Parses a tab name as typed in the shell.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auth" => Some(Tab::Auth),
            "predict" => Some(Tab::Predict),
            "history" => Some(Tab::History),
            _ => None,
        }
    }
}

/// Sign-up form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Password.
    pub password: String,
}

impl SignupForm {
    /// Empties every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Login form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Feedback form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackForm {
    /// Whether the user marks the prediction correct.
    pub is_correct: bool,
    /// Rating in `MIN_RATING..=MAX_RATING`.
    pub rating: u8,
    /// Optional comment text.
    pub comment: String,
    /// Last submit outcome.
    pub message: Option<String>,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self {
            is_correct: true,
            rating: MAX_RATING,
            comment: String::new(),
            message: None,
        }
    }
}

impl FeedbackForm {
    /// Sets rating, clamped into range.
    pub fn set_rating(&mut self, rating: u8) {
        self.rating = rating.clamp(MIN_RATING, MAX_RATING);
    }

    /// Sets rating from raw text; anything unparsable becomes the minimum.
    pub fn set_rating_text(&mut self, raw: &str) {
        let rating = raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|value| *value != 0)
            .map(|value| value.clamp(MIN_RATING.into(), MAX_RATING.into()) as u8)
            .unwrap_or(MIN_RATING);
        self.set_rating(rating);
    }

    /// Comment to send; blank comments are sent as absent.
    pub fn comment_or_none(&self) -> Option<String> {
        if self.comment.is_empty() {
            None
        } else {
            Some(self.comment.clone())
        }
    }
}

/// Locally owned preview of the selected image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    /// Short content digest identifying the preview.
    pub id: String,
    /// Source file name.
    pub file_name: String,
    /// Image size in bytes.
    pub size_bytes: usize,
}

impl ImagePreview {
    /// Creates a preview handle for `upload`.
    pub fn for_upload(upload: &ImageUpload) -> Self {
        let digest = upload.digest_hex();
        Self {
            id: digest.chars().take(12).collect(),
            file_name: upload.file_name.clone(),
            size_bytes: upload.len(),
        }
    }
}

/// Predict panel state.
#[derive(Debug, Clone, Default)]
pub struct PredictPanel {
    /// Image chosen for the next prediction.
    pub file: Option<ImageUpload>,
    /// Preview of `file`.
    pub preview: Option<ImagePreview>,
    /// Last successful prediction.
    pub prediction: Option<Prediction>,
    /// Last predict outcome.
    pub message: Option<String>,
}

impl PredictPanel {
    /// Replaces the selected image.
    ///
    /// The previous preview is released before the new one is created and is
    /// returned so the caller can account for it.
    pub fn select_file(&mut self, file: Option<ImageUpload>) -> Option<ImagePreview> {
        let released = self.preview.take();
        self.preview = file.as_ref().map(ImagePreview::for_upload);
        self.file = file;
        released
    }
}

/// History tab state.
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    /// User's predictions.
    pub predictions: Vec<Prediction>,
    /// User's feedback.
    pub feedback: Vec<Feedback>,
    /// `false` while a load is pending or before the first load.
    pub loaded: bool,
}

/// Aggregate view state.
#[derive(Debug, Clone)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Active tab.
    pub tab: Tab,
    /// Message shown on the auth view.
    pub message: Option<String>,
    /// Sign-up form.
    pub signup: SignupForm,
    /// Login form.
    pub login: LoginForm,
    /// Predict panel.
    pub predict: PredictPanel,
    /// Feedback form.
    pub feedback: FeedbackForm,
    /// History tab.
    pub history: HistoryView,
}

impl UiState {
    /// Creates default UI state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            tab: Tab::Auth,
            message: None,
            signup: SignupForm::default(),
            login: LoginForm::default(),
            predict: PredictPanel::default(),
            feedback: FeedbackForm::default(),
            history: HistoryView::default(),
        }
    }

    /// Drops everything cached for the logged-in user and shows the auth tab.
    ///
    /// Form inputs of the auth view and the selected image are left as they
    /// are.
    pub fn reset_session_views(&mut self) {
        self.tab = Tab::Auth;
        self.predict.prediction = None;
        self.predict.message = None;
        self.feedback = FeedbackForm::default();
        self.history = HistoryView::default();
    }
}

/// Returns `true` when the logged-in view may be shown.
pub fn shows_logged_in_view(state: &UiState, user: Option<&User>, has_token: bool) -> bool {
    has_token && user.is_some() && state.tab != Tab::Auth
}

/// Formats a confidence with two decimals, or `N/A`.
pub fn format_confidence(confidence: Option<f64>) -> String {
    confidence
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Formats a correctness verdict.
pub fn format_correctness(is_correct: Option<bool>) -> &'static str {
    match is_correct {
        None => "N/A",
        Some(true) => "Yes",
        Some(false) => "No",
    }
}

/// Renders the view for the current state.
pub fn render(state: &UiState, user: Option<&User>, has_token: bool) -> String {
    match user {
        Some(user) if shows_logged_in_view(state, Some(user), has_token) => {
            render_logged_in(state, user)
        }
        _ => render_auth(state),
    }
}

fn render_auth(state: &UiState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Soybean Disease Prediction - Login / Signup");
    if let Some(message) = &state.message {
        let _ = writeln!(out, "! {message}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "[Sign up]");
    let _ = writeln!(out, "  Name:     {}", state.signup.name);
    let _ = writeln!(out, "  Email:    {}", state.signup.email);
    let _ = writeln!(out, "  Password: {}", mask(&state.signup.password));
    let _ = writeln!(out);
    let _ = writeln!(out, "[Log in]");
    let _ = writeln!(out, "  Email:    {}", state.login.email);
    let _ = writeln!(out, "  Password: {}", mask(&state.login.password));
    out
}

fn render_logged_in(state: &UiState, user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Soybean Disease Prediction");
    let _ = writeln!(out, "Logged in as {}", user.name);
    let _ = writeln!(
        out,
        "Tabs: {} | {} | Logout",
        tab_label("Predict", state.tab == Tab::Predict),
        tab_label("History & Feedback", state.tab == Tab::History)
    );
    let _ = writeln!(out);

    match state.tab {
        Tab::Predict => render_predict(&mut out, state),
        Tab::History => render_history(&mut out, &state.history),
        Tab::Auth => {}
    }
    out
}

fn render_predict(out: &mut String, state: &UiState) {
    let panel = &state.predict;
    let _ = writeln!(out, "Upload an image");
    if let Some(message) = &panel.message {
        let _ = writeln!(out, "  {message}");
    }
    match &panel.preview {
        Some(preview) => {
            let _ = writeln!(
                out,
                "  Preview of uploaded image: {} ({} bytes, #{})",
                preview.file_name, preview.size_bytes, preview.id
            );
        }
        None => {
            let _ = writeln!(out, "  No image selected.");
        }
    }

    let Some(prediction) = &panel.prediction else {
        return;
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "Prediction result");
    let _ = writeln!(out, "  Disease:       {}", prediction.predicted_label);
    let _ = writeln!(
        out,
        "  Confidence:    {}",
        format_confidence(prediction.confidence)
    );
    let _ = writeln!(
        out,
        "  Model version: {}",
        prediction.model_version.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(out, "  Created at:    {}", prediction.created_at);

    let form = &state.feedback;
    let _ = writeln!(out);
    let _ = writeln!(out, "Was this prediction correct?");
    let _ = writeln!(
        out,
        "  ({}) Yes  ({}) No",
        if form.is_correct { "x" } else { " " },
        if form.is_correct { " " } else { "x" }
    );
    let _ = writeln!(out, "  Rating (1-5): {}", form.rating);
    let _ = writeln!(out, "  Comments:     {}", form.comment);
    if let Some(message) = &form.message {
        let _ = writeln!(out, "  {message}");
    }
}

fn render_history(out: &mut String, history: &HistoryView) {
    let _ = writeln!(out, "Your predictions");
    if !history.loaded {
        let _ = writeln!(out, "  Loading...");
    } else if history.predictions.is_empty() {
        let _ = writeln!(out, "  No predictions yet.");
    } else {
        for prediction in &history.predictions {
            let _ = writeln!(out, "  ID: {}", prediction.id);
            let _ = writeln!(
                out,
                "  Disease: {} (conf: {})",
                prediction.predicted_label,
                format_confidence(prediction.confidence)
            );
            let _ = writeln!(out, "  Image: {}", prediction.image_url);
            let _ = writeln!(out, "  Created at: {}", prediction.created_at);
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out, "Your feedback");
    if !history.loaded {
        let _ = writeln!(out, "  Loading...");
    } else if history.feedback.is_empty() {
        let _ = writeln!(out, "  No feedback yet.");
    } else {
        for feedback in &history.feedback {
            let _ = writeln!(out, "  Prediction ID: {}", feedback.prediction_id);
            let rating = feedback
                .rating
                .map(|rating| rating.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let _ = writeln!(out, "  Rating: {rating}");
            let _ = writeln!(
                out,
                "  Correct?: {}",
                format_correctness(feedback.is_correct)
            );
            let _ = writeln!(
                out,
                "  Comment: {}",
                feedback.comment.as_deref().unwrap_or("")
            );
            let _ = writeln!(out, "  Created at: {}", feedback.created_at);
            let _ = writeln!(out);
        }
    }
}

fn tab_label(label: &str, active: bool) -> String {
    if active {
        format!("[{label}]")
    } else {
        label.to_string()
    }
}

fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

#[cfg(test)]
mod tests {
    //! Unit tests for view gates, form reducers and rendering.

    use super::*;

    fn user() -> User {
        User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
        }
    }

    fn prediction() -> Prediction {
        Prediction {
            id: 5,
            image_url: "uploads/leaf.jpg".to_string(),
            predicted_label: "bacterial_blight".to_string(),
            confidence: Some(0.876),
            model_version: Some("v2".to_string()),
            created_at: "2025-03-01T10:00:00".to_string(),
        }
    }

    #[test]
    fn logged_in_view_requires_token_user_and_tab() {
        let mut state = UiState::new("0.1.0");
        let user = user();
        assert!(!shows_logged_in_view(&state, Some(&user), true));

        state.tab = Tab::Predict;
        assert!(shows_logged_in_view(&state, Some(&user), true));
        assert!(!shows_logged_in_view(&state, None, true));
        assert!(!shows_logged_in_view(&state, Some(&user), false));
    }

    #[test]
    fn rating_is_clamped() {
        let mut form = FeedbackForm::default();
        assert_eq!(form.rating, MAX_RATING);

        form.set_rating_text("9");
        assert_eq!(form.rating, 5);
        form.set_rating_text("abc");
        assert_eq!(form.rating, 1);
        form.set_rating_text("3");
        assert_eq!(form.rating, 3);
        form.set_rating(0);
        assert_eq!(form.rating, 1);
    }

    #[test]
    fn blank_comment_is_sent_as_none() {
        let mut form = FeedbackForm::default();
        assert_eq!(form.comment_or_none(), None);
        form.comment = "spots look right".to_string();
        assert_eq!(form.comment_or_none().as_deref(), Some("spots look right"));
    }

    #[test]
    fn selecting_a_file_releases_previous_preview() {
        let mut panel = PredictPanel::default();
        let first = ImageUpload::new("a.png", vec![1]).expect("upload builds");
        let second = ImageUpload::new("b.png", vec![2]).expect("upload builds");

        assert_eq!(panel.select_file(Some(first)), None);
        let released = panel.select_file(Some(second)).expect("first preview released");
        assert_eq!(released.file_name, "a.png");
        assert_eq!(
            panel.preview.as_ref().map(|preview| preview.file_name.as_str()),
            Some("b.png")
        );

        let released = panel.select_file(None).expect("second preview released");
        assert_eq!(released.file_name, "b.png");
        assert!(panel.preview.is_none());
        assert!(panel.file.is_none());
    }

    #[test]
    fn renders_prediction_with_two_decimal_confidence() {
        let mut state = UiState::new("0.1.0");
        state.tab = Tab::Predict;
        state.predict.prediction = Some(prediction());

        let view = render(&state, Some(&user()), true);
        assert!(view.contains("Logged in as Ada"));
        assert!(view.contains("Disease:       bacterial_blight"));
        assert!(view.contains("Confidence:    0.88"));
        assert!(view.contains("Rating (1-5): 5"));
    }

    #[test]
    fn renders_history_placeholders() {
        let mut state = UiState::new("0.1.0");
        state.tab = Tab::History;
        let view = render(&state, Some(&user()), true);
        assert!(view.contains("Loading..."));

        state.history.loaded = true;
        let view = render(&state, Some(&user()), true);
        assert!(view.contains("No predictions yet."));
        assert!(view.contains("No feedback yet."));
    }

    #[test]
    fn auth_view_masks_passwords() {
        let mut state = UiState::new("0.1.0");
        state.login.password = "hunter2".to_string();
        let view = render(&state, None, false);
        assert!(view.contains("*******"));
        assert!(!view.contains("hunter2"));
    }

    #[test]
    fn formats_nullable_fields() {
        assert_eq!(format_confidence(None), "N/A");
        assert_eq!(format_correctness(Some(false)), "No");
    }
}
