//! Tests for `cellar status`.

use crate::support::*;

#[test]
fn test_status_symmetric() {
    let t = Test::git(&[("application.yml", "a: 1\n")], ENCRYPT_KEY);

    let output = t.run(&["status"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Cellar Status");
    assert_stdout_contains(&output, "git:");
    assert_stdout_contains(&output, "symmetric");
    assert_stdout_contains(&output, "server-side");
}

#[test]
fn test_status_lists_keystore_aliases() {
    let t = Test::dir(&[], KEYSTORE);
    assert_success(&t.keygen("primary"));

    let output = t.run(&["status"]);
    assert_success(&output);
    assert_stdout_contains(&output, "keystore");
    assert_stdout_contains(&output, "• primary");
}

#[test]
fn test_status_disabled_hint() {
    let t = Test::dir(&[], NO_KEYS);

    let output = t.run(&["status"]);
    assert_success(&output);
    assert_stdout_contains(&output, "disabled");
    assert_stdout_contains(&output, "pass-through");
    assert_stdout_contains(&output, "Enable encryption");
}
