//! Tests for keystore-backed (asymmetric) encryption.

use crate::support::*;

#[test]
fn test_keygen_creates_keystore() {
    let t = Test::dir(&[], KEYSTORE);

    let output = t.keygen("primary");
    assert_success(&output);
    assert_stdout_contains(&output, "age1");

    let keystore = std::fs::read_to_string(t.path().join("keys.toml")).unwrap();
    assert!(keystore.contains("[keys.primary]"));
    assert!(keystore.contains("AGE-SECRET-KEY-"));
}

#[test]
fn test_duplicate_alias_fails() {
    let t = Test::dir(&[], KEYSTORE);
    assert_success(&t.keygen("primary"));

    let output = t.keygen("primary");
    assert!(!output.status.success());
    assert_stderr_contains(&output, "already exists");
}

#[test]
fn test_keygen_requires_keystore() {
    let t = Test::dir(&[], ENCRYPT_KEY);

    let output = t.keygen("primary");
    assert_exit_code(&output, 2);
    assert_stderr_contains(&output, "encrypt.keystore");
}

#[test]
fn test_default_alias_roundtrip() {
    let t = Test::dir(&[], KEYSTORE);
    assert_success(&t.keygen("primary"));

    let ct = t.encrypt("asymmetric", &[]);
    assert!(ct.starts_with("{cipher}"));
    assert!(!ct.starts_with("{cipher}{"));

    let output = t.decrypt(&ct, &[]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "asymmetric");
}

#[test]
fn test_values_select_keys_independently() {
    let t = Test::dir(&[], KEYSTORE);
    assert_success(&t.keygen("primary"));
    assert_success(&t.keygen("alias-A"));
    assert_success(&t.keygen("alias-B"));

    let a = t.encrypt("from-a", &["--key", "alias-A"]);
    let b = t.encrypt("from-b", &["--key", "alias-B"]);
    assert!(a.starts_with("{cipher}{key:alias-A}"));

    // alias-B cannot open a payload sealed for alias-A
    let forged = a.replace("{key:alias-A}", "{key:alias-B}");

    t.write(
        "repo/config-client.properties",
        &format!("one={}\ntwo={}\nthree={}\n", a, b, forged),
    );
    let env = t.env_json("config-client", "default", None);

    assert_eq!(lookup(&env, "one").as_deref(), Some("from-a"));
    assert_eq!(lookup(&env, "two").as_deref(), Some("from-b"));
    assert_eq!(lookup(&env, "invalid.three").as_deref(), Some(forged.as_str()));
}

#[test]
fn test_unknown_alias() {
    let t = Test::dir(&[], KEYSTORE);
    assert_success(&t.keygen("primary"));

    let output = t.run(&["encrypt", "v", "--key", "nope"]);
    assert_exit_code(&output, 7);
    assert_stderr_contains(&output, "UNKNOWN_KEY_ALIAS");
}
