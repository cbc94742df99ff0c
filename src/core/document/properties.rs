//! Line-oriented `key=value` documents.
//!
//! Supports `#`/`!` comments, `=` or `:` separators, backslash line
//! continuation, and the usual escapes (`\t \n \r \\ \uXXXX`).

use super::malformed;
use crate::core::domain::Properties;
use crate::error::Result;

pub(super) fn parse(text: &str, origin: &str) -> Result<Properties> {
    let mut props = Properties::new();

    for (number, line) in logical_lines(text) {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        let (raw_key, raw_value) = split_entry(trimmed);
        let key = unescape(raw_key.trim_end())
            .map_err(|reason| malformed(origin, format!("line {}: {}", number, reason)))?;
        if key.is_empty() {
            return Err(malformed(origin, format!("line {}: empty key", number)));
        }
        let value = unescape(raw_value.trim_start())
            .map_err(|reason| malformed(origin, format!("line {}: {}", number, reason)))?;

        props.insert(key, value);
    }

    Ok(props)
}

pub(super) fn serialize(props: &Properties) -> String {
    let mut output = String::new();
    for (key, value) in props.iter() {
        output.push_str(&escape(key, true));
        output.push('=');
        output.push_str(&escape(value, false));
        output.push('\n');
    }
    output
}

/// Join continuation lines, yielding (1-based first line number, logical line).
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, line) in text.lines().enumerate() {
        let piece = match current {
            Some(_) => line.trim_start(),
            None => line,
        };

        // Comment lines never continue.
        let continued = ends_with_odd_backslashes(piece)
            && !(current.is_none() && is_comment(piece));
        let piece = if continued {
            &piece[..piece.len() - 1]
        } else {
            piece
        };

        let entry = current.get_or_insert_with(|| (idx + 1, String::new()));
        entry.1.push_str(piece);

        if !continued {
            if let Some(done) = current.take() {
                lines.push(done);
            }
        }
    }

    if let Some(done) = current {
        lines.push(done);
    }
    lines
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with('!')
}

fn ends_with_odd_backslashes(s: &str) -> bool {
    s.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

/// Split at the first unescaped `=` or `:`.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '=' | ':' if !escaped => return (&line[..i], &line[i + 1..]),
            _ => escaped = false,
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid unicode escape \\u{}", hex))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if is_key && i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}
