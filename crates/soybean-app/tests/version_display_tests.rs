//! Integration tests for build version exposure.

use soybean_app::app_version;

#[test]
fn version_display_tests_matches_root_version_file() {
    let expected = include_str!("../../../VERSION").trim();
    assert_eq!(app_version(), expected);
    assert!(!app_version().is_empty());
}
