//! Nested-mapping (YAML) documents.
//!
//! Nested keys flatten to dot-separated paths, sequences to indexed keys
//! (`servers[0]`). Cipher values must be quoted in the source document since
//! a bare `{cipher}...` is a YAML flow mapping.

use serde_yaml::{Mapping, Value};

use super::malformed;
use crate::core::domain::Properties;
use crate::error::Result;

pub(super) fn parse(text: &str, origin: &str) -> Result<Properties> {
    let root: Value = serde_yaml::from_str(text).map_err(|e| malformed(origin, e))?;

    let mut props = Properties::new();
    match root {
        Value::Null => {}
        Value::Mapping(map) => flatten_mapping(&map, "", &mut props, origin)?,
        Value::Tagged(tagged) => match tagged.value {
            Value::Mapping(map) => flatten_mapping(&map, "", &mut props, origin)?,
            _ => return Err(malformed(origin, "top level must be a mapping")),
        },
        _ => return Err(malformed(origin, "top level must be a mapping")),
    }
    Ok(props)
}

pub(super) fn serialize(props: &Properties) -> Result<String> {
    // Keys that are also parents of other keys cannot nest both ways; their
    // descendants are written flat at the root instead.
    let parents: Vec<&str> = props
        .keys()
        .filter(|k| {
            let prefix = format!("{}.", k);
            props.keys().any(|other| other.starts_with(&prefix))
        })
        .collect();

    let mut root = Mapping::new();
    for (key, value) in props.iter() {
        let under_parent = parents
            .iter()
            .any(|p| key.len() > p.len() && key.starts_with(p) && key[p.len()..].starts_with('.'));

        if under_parent {
            root.insert(Value::String(key.to_string()), Value::String(value.to_string()));
        } else {
            insert_nested(&mut root, key, value);
        }
    }

    serde_yaml::to_string(&Value::Mapping(root)).map_err(|e| malformed("<render>", e))
}

fn insert_nested(root: &mut Mapping, key: &str, value: &str) {
    let mut segments = key.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        let name = Value::String(segment.to_string());
        if segments.peek().is_none() {
            current.insert(name, Value::String(value.to_string()));
            return;
        }
        let child = current
            .entry(name)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        match child {
            Value::Mapping(map) => current = map,
            _ => return,
        }
    }
}

fn flatten_mapping(map: &Mapping, prefix: &str, out: &mut Properties, origin: &str) -> Result<()> {
    for (k, v) in map {
        let segment = scalar_text(k)
            .ok_or_else(|| malformed(origin, format!("unsupported key under '{}'", prefix)))?;
        let path = if prefix.is_empty() {
            segment
        } else {
            format!("{}.{}", prefix, segment)
        };
        flatten_value(v, &path, out, origin)?;
    }
    Ok(())
}

fn flatten_value(value: &Value, path: &str, out: &mut Properties, origin: &str) -> Result<()> {
    match value {
        Value::Mapping(map) => flatten_mapping(map, path, out, origin),
        Value::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(item, &format!("{}[{}]", path, i), out, origin)?;
            }
            Ok(())
        }
        Value::Tagged(tagged) => flatten_value(&tagged.value, path, out, origin),
        scalar => {
            let text = scalar_text(scalar).unwrap_or_default();
            if out.insert(path, text).is_some() {
                return Err(malformed(origin, format!("duplicate key '{}'", path)));
            }
            Ok(())
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Mapping(_) | Value::Sequence(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> Properties {
        parse(text, "test.yml").unwrap()
    }

    #[test]
    fn test_nested_keys_flatten() {
        let props = parse_ok("a:\n  b:\n    c: value\n  d: 1\n");
        assert_eq!(props.get("a.b.c"), Some("value"));
        assert_eq!(props.get("a.d"), Some("1"));
    }

    #[test]
    fn test_scalars_become_strings() {
        let props = parse_ok("port: 8080\nenabled: true\nratio: 0.5\nempty:\n");
        assert_eq!(props.get("port"), Some("8080"));
        assert_eq!(props.get("enabled"), Some("true"));
        assert_eq!(props.get("ratio"), Some("0.5"));
        assert_eq!(props.get("empty"), Some(""));
    }

    #[test]
    fn test_sequences_use_indexes() {
        let props = parse_ok("servers:\n  - alpha\n  - host: beta\n");
        assert_eq!(props.get("servers[0]"), Some("alpha"));
        assert_eq!(props.get("servers[1].host"), Some("beta"));
    }

    #[test]
    fn test_quoted_cipher_value_is_unquoted() {
        let props = parse_ok("user:\n  password: '{cipher}{key:ops}AbCd=='\n");
        assert_eq!(props.get("user.password"), Some("{cipher}{key:ops}AbCd=="));
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        assert!(parse("a: 'open\n", "x.yml").is_err());
    }

    #[test]
    fn test_duplicate_key_is_malformed() {
        assert!(parse("a: 1\na: 2\n", "x.yml").is_err());
    }

    #[test]
    fn test_dotted_and_nested_key_collision_is_malformed() {
        let err = parse("a.b: 1\na:\n  b: 2\n", "x.yml").unwrap_err();
        assert_eq!(err.code(), "MALFORMED_DOCUMENT");
        assert!(err.to_string().contains("a.b"));
    }

    #[test]
    fn test_top_level_scalar_is_malformed() {
        assert!(parse("just text\n", "x.yml").is_err());
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("# only a comment\n").is_empty());
    }

    #[test]
    fn test_serialize_nests_and_reparses() {
        let props: Properties = [
            ("server.port", "8080"),
            ("server.host", "localhost"),
            ("secret", "{cipher}AbCd=="),
        ]
        .into_iter()
        .collect();

        let text = serialize(&props).unwrap();
        assert!(text.contains("server:"));
        assert_eq!(parse_ok(&text), props);
    }

    #[test]
    fn test_serialize_parent_and_child_keys() {
        let props: Properties = [("a", "1"), ("a.b", "2")].into_iter().collect();
        let text = serialize(&props).unwrap();
        let reparsed = parse_ok(&text);

        assert_eq!(reparsed.get("a"), Some("1"));
        assert_eq!(reparsed.get("a.b"), Some("2"));
    }
}
