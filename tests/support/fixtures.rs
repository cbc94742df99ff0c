//! Test fixtures and constants.

/// Symmetric key used by keyed environments.
pub const ENCRYPT_KEY: &str = "[encrypt]\nkey = \"test-server-key\"\n";

/// Keystore-backed encryption with `primary` as the default alias.
pub const KEYSTORE: &str =
    "[encrypt.keystore]\npath = \"keys.toml\"\ndefault_alias = \"primary\"\n";

/// No server-side cryptography.
pub const NO_KEYS: &str = "";

/// Documents for `config-client` in every override slot.
pub const OVERRIDE_DOCUMENTS: &[(&str, &str)] = &[
    ("config-client-development.properties", "k=app-profile\nuser.role=Developer\n"),
    ("config-client.yml", "k: app\napp:\n  name: config-client\n"),
    ("application-development.yml", "k: application-profile\n"),
    ("application.properties", "k=application\nshared=true\n"),
];

/// An undecryptable cipher value with an ad hoc secret.
pub const BROKEN_CIPHER: &str = "{cipher}{secret:d3v3L-key}AbCdEf==";
