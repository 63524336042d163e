//! Integration tests driving the controller through shell commands.

mod common;

use soybean_api::Method;
use soybean_app::AppError;
use soybean_app::shell::{Flow, execute, parse_command};
use soybean_ui::Tab;

fn run(controller: &mut soybean_app::ViewController, line: &str) -> (String, Option<AppError>) {
    let command = parse_command(line).expect("command should parse");
    match execute(controller, command) {
        (Flow::Continue(text), failure) => (text, failure),
        (Flow::Quit, _) => panic!("unexpected quit for '{line}'"),
    }
}

#[test]
fn shell_session_tests_login_predict_feedback_round() {
    let transport = common::login_transport();
    transport.respond(Method::Post, "/predict", 200, common::PREDICTION_BODY);
    transport.respond(Method::Post, "/feedback/", 200, "{}");
    let mut controller = common::controller(&transport);

    run(&mut controller, "set login.email ada@example.test");
    run(&mut controller, "set login.password pw");
    let (view, failure) = run(&mut controller, "login");
    assert!(failure.is_none());
    assert!(view.contains("Logged in as Ada"));
    assert!(view.contains("No image selected."));

    let (view, failure) = run(&mut controller, "predict");
    assert!(matches!(failure, Some(AppError::NoImageSelected)));
    assert!(view.contains("Please choose an image."));

    controller.select_image(Some(common::fixture_image()));
    let (view, _) = run(&mut controller, "predict");
    assert!(view.contains("Disease:       frogeye_leaf_spot"));

    run(&mut controller, "set feedback.correct no");
    run(&mut controller, "set feedback.rating 7");
    let (view, failure) = run(&mut controller, "feedback");
    assert!(failure.is_none());
    assert!(view.contains("(x) No"));
    assert!(view.contains("Rating (1-5): 5"));
    assert!(view.contains("Feedback submitted. Thank you!"));

    let (view, _) = run(&mut controller, "logout");
    assert_eq!(controller.tab(), Tab::Auth);
    assert!(view.contains("Login / Signup"));
}

#[test]
fn shell_session_tests_missing_image_file_is_reported() {
    let transport = common::ScriptedTransport::new();
    let mut controller = common::controller(&transport);

    let (view, failure) = run(&mut controller, "file /definitely/not/here.jpg");
    assert!(matches!(failure, Some(AppError::ImageRead { .. })));
    assert!(view.contains("cannot read image"));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn shell_session_tests_logged_out_tab_switch_is_refused() {
    let transport = common::ScriptedTransport::new();
    let mut controller = common::controller(&transport);

    let (view, failure) = run(&mut controller, "tab history");
    assert!(matches!(failure, Some(AppError::NotLoggedIn)));
    assert!(view.contains("Please log in first."));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn shell_session_tests_check_reports_health() {
    let transport = common::ScriptedTransport::new();
    transport.respond(Method::Get, "/health", 200, r#"{"status":"ok"}"#);
    let mut controller = common::controller(&transport);

    let (text, failure) = run(&mut controller, "check");
    assert!(failure.is_none());
    assert_eq!(text, "API is up.");
}
