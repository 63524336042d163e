//! Line-oriented shell commands that drive the [`ViewController`].

use std::path::PathBuf;

use soybean_ui::Tab;
use thiserror::Error;

use crate::{AppError, ViewController, load_image};

/// Form field addressable with `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `signup.name`
    SignupName,
    /// `signup.email`
    SignupEmail,
    /// `signup.password`
    SignupPassword,
    /// `login.email`
    LoginEmail,
    /// `login.password`
    LoginPassword,
    /// `feedback.correct`
    FeedbackCorrect,
    /// `feedback.rating`
    FeedbackRating,
    /// `feedback.comment`
    FeedbackComment,
}

impl Field {
    fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "signup.name" => Field::SignupName,
            "signup.email" => Field::SignupEmail,
            "signup.password" => Field::SignupPassword,
            "login.email" => Field::LoginEmail,
            "login.password" => Field::LoginPassword,
            "feedback.correct" => Field::FeedbackCorrect,
            "feedback.rating" => Field::FeedbackRating,
            "feedback.comment" => Field::FeedbackComment,
            _ => return None,
        })
    }
}

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the command list.
    Help,
    /// Re-render the current view.
    Show,
    /// Set a form field.
    Set(Field, String),
    /// Submit sign-up.
    Signup,
    /// Submit login.
    Login,
    /// Log out.
    Logout,
    /// Select an image, or clear the selection when `None`.
    File(Option<PathBuf>),
    /// Run a prediction.
    Predict,
    /// Submit feedback.
    Feedback,
    /// Switch tabs.
    Tab(Tab),
    /// Reload history.
    History,
    /// Check API health.
    Check,
    /// Leave the shell.
    Quit,
}

/// What the shell loop should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Print the text and keep reading.
    Continue(String),
    /// Stop reading.
    Quit,
}

/// Command-line usage text.
pub const HELP: &str = "\
commands:
  show                      re-render the current view
  set <field> <value>       fields: signup.name signup.email signup.password
                            login.email login.password feedback.correct (yes|no)
                            feedback.rating (1-5) feedback.comment
  signup | login | logout
  file [path]               select an image (no path clears the selection)
  predict                   run a prediction on the selected image
  feedback                  submit feedback for the last prediction
  tab <predict|history>     switch tabs
  history                   reload history
  check                     ask the API whether it is up
  quit";

/// Parses one input line. Blank lines parse to [`Command::Show`].
///
/// # Errors
/// Returns [`ParseError`] for unknown commands, fields, or tabs.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "" | "show" => Command::Show,
        "help" | "?" => Command::Help,
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field =
                Field::parse(name).ok_or_else(|| ParseError::UnknownField(name.to_string()))?;
            Command::Set(field, value.trim().to_string())
        }
        "signup" => Command::Signup,
        "login" => Command::Login,
        "logout" => Command::Logout,
        "file" if rest.is_empty() => Command::File(None),
        "file" => Command::File(Some(PathBuf::from(rest))),
        "predict" => Command::Predict,
        "feedback" => Command::Feedback,
        "tab" => {
            let tab = Tab::parse(rest).ok_or_else(|| ParseError::UnknownTab(rest.to_string()))?;
            Command::Tab(tab)
        }
        "history" => Command::History,
        "check" => Command::Check,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(command)
}

/// Runs one command against the controller.
///
/// Action failures are already reflected in the rendered view; they are
/// returned alongside so the caller can log them.
pub fn execute(controller: &mut ViewController, command: Command) -> (Flow, Option<AppError>) {
    let result = match command {
        Command::Quit => return (Flow::Quit, None),
        Command::Help => return (Flow::Continue(HELP.to_string()), None),
        Command::Check => {
            let text = match controller.health() {
                Ok(status) if status.is_ok() => "API is up.".to_string(),
                Ok(status) => format!("API reported status '{}'.", status.status),
                Err(error) => format!("API check failed: {error}"),
            };
            return (Flow::Continue(text), None);
        }
        Command::Show => Ok(()),
        Command::Set(field, value) => {
            apply_field(controller, field, value);
            Ok(())
        }
        Command::Signup => controller.sign_up(),
        Command::Login => controller.log_in(),
        Command::Logout => {
            controller.log_out();
            Ok(())
        }
        Command::File(None) => {
            controller.select_image(None);
            Ok(())
        }
        Command::File(Some(path)) => {
            load_image(&path).map(|upload| controller.select_image(Some(upload)))
        }
        Command::Predict => controller.run_prediction(),
        Command::Feedback => controller.submit_feedback(),
        Command::Tab(tab) => controller.select_tab(tab),
        Command::History => controller.load_history(),
    };

    let mut text = controller.render();
    if let Err(error) = &result
        && matches!(
            error,
            AppError::TabUnavailable(_) | AppError::ImageRead { .. } | AppError::Core(_)
        )
    {
        text.push_str(&format!("\n! {error}\n"));
    }
    if let Err(AppError::NotLoggedIn) = &result
        && !controller.auth().is_authenticated()
    {
        text.push_str("\n! Please log in first.\n");
    }

    (Flow::Continue(text), result.err())
}

fn apply_field(controller: &mut ViewController, field: Field, value: String) {
    match field {
        Field::SignupName => controller.signup_form_mut().name = value,
        Field::SignupEmail => controller.signup_form_mut().email = value,
        Field::SignupPassword => controller.signup_form_mut().password = value,
        Field::LoginEmail => controller.login_form_mut().email = value,
        Field::LoginPassword => controller.login_form_mut().password = value,
        Field::FeedbackCorrect => {
            controller.feedback_form_mut().is_correct =
                matches!(value.to_ascii_lowercase().as_str(), "yes" | "y" | "true")
        }
        Field::FeedbackRating => controller.feedback_form_mut().set_rating_text(&value),
        Field::FeedbackComment => controller.feedback_form_mut().comment = value,
    }
}

/// Shell input errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// First word is not a command.
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    /// `set` named an unknown field.
    #[error("unknown field '{0}'")]
    UnknownField(String),
    /// `tab` named an unknown tab.
    #[error("unknown tab '{0}'")]
    UnknownTab(String),
}
