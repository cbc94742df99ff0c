//! Tests for `cellar encrypt` / `cellar decrypt` and transparent decryption.

use crate::support::*;

#[test]
fn test_roundtrip_with_default_key() {
    let t = Test::dir(&[], ENCRYPT_KEY);

    let ct = t.encrypt("p@ss w0rd!", &[]);
    assert!(ct.starts_with("{cipher}"));
    assert!(!ct.contains("p@ss"));

    let output = t.decrypt(&ct, &[]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "p@ss w0rd!");
}

#[test]
fn test_ad_hoc_secret_is_embedded() {
    let t = Test::dir(&[], NO_KEYS);

    let ct = t.encrypt("Developer", &["--secret", "adhoc"]);
    assert!(ct.starts_with("{cipher}{secret:adhoc}"));

    let output = t.decrypt(&ct, &[]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "Developer");
}

#[test]
fn test_no_key_is_distinct_from_bad_ciphertext() {
    let t = Test::dir(&[], NO_KEYS);
    let output = t.run(&["encrypt", "value"]);
    assert_exit_code(&output, 6);
    assert_stderr_contains(&output, "NO_KEY");

    let t = Test::dir(&[], ENCRYPT_KEY);
    let output = t.decrypt("{cipher}AbCdEf==", &[]);
    assert_exit_code(&output, 8);
    assert_stderr_contains(&output, "DECRYPTION_FAILED");
}

#[test]
fn test_tampered_ciphertext_fails() {
    let t = Test::dir(&[], ENCRYPT_KEY);
    let ct = t.encrypt("Developer", &[]);

    let mut chars: Vec<char> = ct.chars().collect();
    let mid = "{cipher}".len() + (chars.len() - "{cipher}".len()) / 2;
    chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();

    let output = t.decrypt(&tampered, &[]);
    assert_exit_code(&output, 8);
}

#[test]
fn test_encrypt_key_from_environment() {
    let t = Test::dir(&[], NO_KEYS);

    let output = t
        .cmd()
        .env("CELLAR_ENCRYPT_KEY", "from-env")
        .args(["encrypt", "v"])
        .output()
        .unwrap();
    assert_success(&output);
    let ct = stdout(&output).trim().to_string();

    let output = t
        .cmd()
        .env("CELLAR_ENCRYPT_KEY", "from-env")
        .args(["decrypt", &ct])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "v");
}

#[test]
fn test_environment_decrypts_values() {
    let t = Test::dir(&[], ENCRYPT_KEY);
    let ct = t.encrypt("Developer", &[]);
    t.write(
        "repo/config-client-development.properties",
        &format!("user.role={}\nuser.password={}\n", ct, BROKEN_CIPHER),
    );

    let env = t.env_json("config-client", "development", None);
    assert_eq!(lookup(&env, "user.role").as_deref(), Some("Developer"));
    assert_eq!(lookup(&env, "user.password"), None);
    assert_eq!(
        lookup(&env, "invalid.user.password").as_deref(),
        Some(BROKEN_CIPHER)
    );
}

#[test]
fn test_yaml_cipher_values_are_quoted() {
    let t = Test::dir(&[], ENCRYPT_KEY);
    let ct = t.encrypt("nested-secret", &[]);
    t.write("repo/config-client.yml", &format!("db:\n  password: '{}'\n", ct));

    let env = t.env_json("config-client", "default", None);
    assert_eq!(lookup(&env, "db.password").as_deref(), Some("nested-secret"));
}

#[test]
fn test_decryption_disabled_passes_through() {
    let document = format!("user.password={}\n", BROKEN_CIPHER);
    let t = Test::dir(
        &[("config-client.properties", document.as_str())],
        "[encrypt]\nenabled = false\nkey = \"k\"\n",
    );

    let env = t.env_json("config-client", "default", None);
    assert_eq!(lookup(&env, "user.password").as_deref(), Some(BROKEN_CIPHER));
    assert_eq!(lookup(&env, "invalid.user.password"), None);
}

#[test]
fn test_no_keys_configured_passes_through() {
    let document = format!("user.password={}\nuser.role=Developer\n", BROKEN_CIPHER);
    let t = Test::git(&[("config-client.properties", document.as_str())], NO_KEYS);

    let env = t.env_json("config-client", "default", None);
    assert_eq!(lookup(&env, "user.password").as_deref(), Some(BROKEN_CIPHER));
    assert_eq!(lookup(&env, "invalid.user.password"), None);
    assert_eq!(lookup(&env, "user.role").as_deref(), Some("Developer"));

    let output = t.run(&["env", "config-client", "default"]);
    assert_success(&output);
    assert_stdout_contains(&output, &format!("user.password = {}", BROKEN_CIPHER));
    assert!(!stdout(&output).contains("invalid."));
}

#[test]
fn test_key_and_secret_flags_conflict() {
    let t = Test::dir(&[], ENCRYPT_KEY);
    let output = t.run(&["encrypt", "v", "--key", "a", "--secret", "b"]);
    assert!(!output.status.success());
}
