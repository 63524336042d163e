//! Integration tests for log redaction.

use soybean_app::redact_sensitive;

#[test]
fn log_redaction_tests_removes_obvious_secret_markers() {
    let raw = "authorization=Bearer abc123";
    let redacted = redact_sensitive(raw);

    assert!(redacted.contains("<redacted>"));
    assert!(!redacted.contains("abc123"));
}

#[test]
fn log_redaction_tests_hides_password_set_commands() {
    let redacted = redact_sensitive("set login.password hunter2");

    assert_eq!(redacted, "set login.password=<redacted>");
}
