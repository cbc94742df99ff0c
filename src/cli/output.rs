//! Shared CLI output helpers.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, commands
//! - Red: errors, undecryptable properties
//! - Cyan: paths, key aliases, hints
//! - Bold: headers, values
//! - Dimmed: secondary info, cipher text

use colored::{ColoredString, Colorize};
use std::fmt::Display;

use crate::core::cipher::CipherValue;
use crate::core::constants::INVALID_PREFIX;

const RULE_WIDTH: usize = 56;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Apply `style` only when colors are enabled.
fn paint(text: &str, style: fn(&str) -> ColoredString) -> String {
    if colors_enabled() {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ generated key primary`
pub fn success(msg: &str) {
    println!("{} {}", paint("✓", |s| s.green()), msg);
}

/// Print an error message to stderr (red).
///
/// Example: `✗ revision not found: v9`
pub fn error(msg: &str) {
    eprintln!("{} {}", paint("✗", |s| s.red()), msg);
}

/// Print a hint message (cyan).
///
/// Example: `→ run: cellar status`
pub fn hint(msg: &str) {
    if colors_enabled() {
        println!("{} {}", "→".cyan(), msg.cyan());
    } else {
        println!("→ {}", msg);
    }
}

/// Print a bold header.
pub fn header(title: &str) {
    println!("{}", paint(title, |s| s.bold()));
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  source  git:/srv/config`
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!("  {}  {}", label.dimmed(), value.to_string().bold());
    } else {
        println!("  {}  {}", label, value);
    }
}

/// Print one resolved property as `key = value`.
///
/// Undecryptable properties are flagged red; cipher text left for the
/// client is dimmed.
pub fn property(key: &str, value: &str) {
    let key = if key.starts_with(INVALID_PREFIX) {
        paint(key, |s| s.red())
    } else {
        paint(key, |s| s.cyan())
    };
    let value = if CipherValue::is_cipher(value) {
        paint(value, |s| s.dimmed())
    } else {
        value.to_string()
    };
    println!("  {} = {}", key, value);
}

/// Print a list item with bullet.
///
/// Example: `  • primary`
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Print a horizontal rule separator.
pub fn rule() {
    println!("{}", paint(&"─".repeat(RULE_WIDTH), |s| s.dimmed()));
}

/// Format a path string in cyan.
pub fn path(p: &str) -> String {
    paint(p, |s| s.cyan())
}

/// Format a command string in green.
pub fn cmd(c: &str) -> String {
    paint(c, |s| s.green())
}

/// Format a key alias in cyan.
pub fn key(k: &str) -> String {
    paint(k, |s| s.cyan())
}

/// Print a dimmed/secondary message.
///
/// Example: `no documents matched`
pub fn dimmed(msg: &str) {
    println!("{}", paint(msg, |s| s.dimmed()));
}

/// Print a section header with a separator line.
///
/// Example:
/// ```text
/// Cellar Status
/// ────────────────────────────────────────────────────────
/// ```
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}
