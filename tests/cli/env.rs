//! Tests for `cellar env` and `cellar render`.

use crate::support::*;

#[test]
fn test_resolves_profile_document() {
    let t = Test::git(
        &[("config-client-development.properties", "user.role=Developer\n")],
        NO_KEYS,
    );

    let env = t.env_json("config-client", "development", None);
    assert_eq!(env["name"], "config-client");
    assert_eq!(env["profiles"][0], "development");
    assert_eq!(lookup(&env, "user.role").as_deref(), Some("Developer"));
}

#[test]
fn test_most_specific_document_wins() {
    let t = Test::git(OVERRIDE_DOCUMENTS, NO_KEYS);

    let env = t.env_json("config-client", "development", None);
    let names: Vec<String> = sources(&env).into_iter().map(|(n, _)| n).collect();

    assert_eq!(names.len(), 4);
    assert!(names[0].ends_with("/config-client-development.properties"));
    assert!(names[1].ends_with("/config-client.yml"));
    assert!(names[2].ends_with("/application-development.yml"));
    assert!(names[3].ends_with("/application.properties"));

    assert_eq!(lookup(&env, "k").as_deref(), Some("app-profile"));
    assert_eq!(lookup(&env, "app.name").as_deref(), Some("config-client"));
    assert_eq!(lookup(&env, "shared").as_deref(), Some("true"));
}

#[test]
fn test_nested_document_precedes_properties_for_same_name() {
    let t = Test::git(
        &[
            ("config-client.properties", "k=properties\n"),
            ("config-client.yml", "k: yaml\n"),
        ],
        NO_KEYS,
    );

    let env = t.env_json("config-client", "default", None);
    assert_eq!(sources(&env).len(), 2);
    assert_eq!(lookup(&env, "k").as_deref(), Some("yaml"));
}

#[test]
fn test_later_profile_wins() {
    let t = Test::git(
        &[
            ("config-client-development.properties", "k=development\n"),
            ("config-client-db.properties", "k=db\n"),
        ],
        NO_KEYS,
    );

    let env = t.env_json("config-client", "development,db", None);
    assert_eq!(lookup(&env, "k").as_deref(), Some("db"));
    assert_eq!(env["profiles"], serde_json::json!(["development", "db"]));
}

#[test]
fn test_no_documents_is_empty_environment() {
    let t = Test::git(&[("unrelated.txt", "x")], NO_KEYS);

    let env = t.env_json("config-client", "development", None);
    assert!(sources(&env).is_empty());
    assert!(env["version"].is_string());
}

#[test]
fn test_label_pins_revision() {
    let t = Test::git(&[("config-client.properties", "release=1\n")], NO_KEYS);
    let head = t.commit(&[("config-client.properties", "release=2\n")], "bump");

    let first = {
        let repo = git2::Repository::open(t.repo_path()).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        let id = head.parent(0).unwrap().id().to_string();
        id
    };
    repo::tag(&t.repo_path(), "v1", &first);

    let tagged = t.env_json("config-client", "default", Some("v1"));
    assert_eq!(lookup(&tagged, "release").as_deref(), Some("1"));
    assert_eq!(tagged["label"], "v1");
    assert_eq!(tagged["version"], first.as_str());

    let latest = t.env_json("config-client", "default", None);
    assert_eq!(lookup(&latest, "release").as_deref(), Some("2"));
    assert_eq!(latest["version"], head.as_str());
}

#[test]
fn test_label_slash_escape() {
    let t = Test::git(&[("config-client.properties", "k=main\n")], NO_KEYS);
    let commit = t.commit(&[("config-client.properties", "k=feature\n")], "feature");
    repo::branch(&t.repo_path(), "feature/x", &commit);

    let env = t.env_json("config-client", "default", Some("feature(_)x"));
    assert_eq!(env["label"], "feature/x");
    assert_eq!(lookup(&env, "k").as_deref(), Some("feature"));
}

#[test]
fn test_unknown_label_fails() {
    let t = Test::git(&[("config-client.properties", "k=v\n")], NO_KEYS);

    let output = t.run(&["env", "config-client", "default", "no-such-label"]);
    assert_exit_code(&output, 3);
    assert_stderr_contains(&output, "REVISION_NOT_FOUND");
}

#[test]
fn test_malformed_document_fails_request() {
    let t = Test::git(&[("config-client.yml", "k: 1\nk: 2\n")], NO_KEYS);

    let output = t.run(&["env", "config-client", "default"]);
    assert_exit_code(&output, 5);
    assert_stderr_contains(&output, "config-client.yml");
}

#[test]
fn test_search_paths() {
    let t = Test::new();
    repo::init(&t.repo_path());
    repo::commit(
        &t.repo_path(),
        &[
            ("config-client/config-client.yml", "k: nested\n"),
            ("application.yml", "k: root\nshared: yes\n"),
        ],
        "init",
    );
    t.write_config("[source]\ngit = \"repo\"\nsearch_paths = [\"\", \"{application}\"]\n");

    let env = t.env_json("config-client", "default", None);
    assert_eq!(lookup(&env, "k").as_deref(), Some("nested"));
    assert_eq!(lookup(&env, "shared").as_deref(), Some("yes"));
}

#[test]
fn test_directory_source() {
    let t = Test::dir(&[("config-client.properties", "k=from-dir\n")], NO_KEYS);

    let env = t.env_json("config-client", "default", None);
    assert_eq!(env["label"], "local");
    assert_eq!(lookup(&env, "k").as_deref(), Some("from-dir"));
}

#[test]
fn test_text_output_lists_properties() {
    let t = Test::git(OVERRIDE_DOCUMENTS, NO_KEYS);

    let output = t.run(&["env", "config-client", "development"]);
    assert_success(&output);
    assert_stdout_contains(&output, "config-client (development)");
    assert_stdout_contains(&output, "user.role = Developer");
}

#[test]
fn test_render_properties() {
    let t = Test::git(OVERRIDE_DOCUMENTS, NO_KEYS);

    let output = t.run(&["render", "config-client", "development"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("k=app-profile\n"), "got: {}", out);
    assert!(out.contains("shared=true\n"), "got: {}", out);
    assert_eq!(out.matches("k=").count(), 1);
}

#[test]
fn test_render_yaml() {
    let t = Test::git(OVERRIDE_DOCUMENTS, NO_KEYS);

    let output = t.run(&["render", "config-client", "development", "--format", "yml"]);
    assert_success(&output);
    let rendered: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(rendered["app"]["name"].as_str(), Some("config-client"));
    assert_eq!(rendered["k"].as_str(), Some("app-profile"));
}
