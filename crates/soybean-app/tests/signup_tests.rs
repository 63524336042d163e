//! Integration tests for account creation.

mod common;

use soybean_api::{Method, RequestBody};

fn fill_signup(controller: &mut soybean_app::ViewController) {
    let form = controller.signup_form_mut();
    form.name = "Ada".to_string();
    form.email = "ada@example.test".to_string();
    form.password = "pw".to_string();
}

#[test]
fn signup_tests_success_clears_form_and_reports() {
    let transport = common::ScriptedTransport::new();
    transport.respond(Method::Post, "/users/", 200, common::USER_BODY);
    let mut controller = common::controller(&transport);
    fill_signup(&mut controller);

    controller.sign_up().expect("signup should succeed");

    assert_eq!(
        controller.ui().message.as_deref(),
        Some("Signup successful. You can now log in.")
    );
    assert!(controller.ui().signup.name.is_empty());
    assert!(controller.ui().signup.password.is_empty());
    assert_eq!(controller.token(), None);

    let request = transport.requests().pop().expect("signup request recorded");
    assert_eq!(request.bearer, None);
    assert_eq!(
        request.body,
        RequestBody::Json(serde_json::json!({
            "name": "Ada",
            "email": "ada@example.test",
            "password": "pw",
        }))
    );
}

#[test]
fn signup_tests_rejection_keeps_form_and_shows_body() {
    let transport = common::ScriptedTransport::new();
    transport.respond(
        Method::Post,
        "/users/",
        400,
        r#"{"detail":"Email Already Registered"}"#,
    );
    let mut controller = common::controller(&transport);
    fill_signup(&mut controller);

    assert!(controller.sign_up().is_err());

    assert_eq!(
        controller.ui().message.as_deref(),
        Some(r#"Signup failed: {"detail":"Email Already Registered"}"#)
    );
    assert_eq!(controller.ui().signup.email, "ada@example.test");
}

#[test]
fn signup_tests_blank_field_skips_network() {
    let transport = common::ScriptedTransport::new();
    let mut controller = common::controller(&transport);
    controller.signup_form_mut().name = "Ada".to_string();

    assert!(controller.sign_up().is_err());
    assert_eq!(transport.request_count(), 0);
    assert_eq!(
        controller.ui().message.as_deref(),
        Some("Signup failed: email must be non-empty")
    );
}
