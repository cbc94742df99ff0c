//! Core library components.
//!
//! The resolution engine and property cryptography. Nothing here prints;
//! the CLI layer owns all output.

pub mod assembler;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod document;
pub mod domain;
pub mod keys;
pub mod resolver;
pub mod server;
pub mod source;
pub mod types;
