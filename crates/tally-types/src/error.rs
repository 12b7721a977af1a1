//! Error types for tally.

use std::io;

/// Errors produced by the tally console and its domain functions.
///
/// Every variant is terminal for the current input line only: the dispatch
/// loop renders the error and reads the next line.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    #[error("unknown command: {name}. Type {help} for available commands")]
    UnknownCommand { name: String, help: String },

    #[error("command {command} has no param {param}")]
    UnknownParam { command: String, param: String },

    #[error("expected {expected} argument(s), got {got}. Usage: {usage}")]
    ArityMismatch {
        usage: String,
        expected: usize,
        got: usize,
    },

    #[error("not enough args for param {alias}. Usage: {usage}. Expected types: {expected}")]
    InsufficientParamArgs {
        alias: String,
        usage: String,
        expected: String,
    },

    #[error("cannot convert {raw:?} to {expected}. Usage: {usage}")]
    Coercion {
        raw: String,
        expected: &'static str,
        usage: String,
    },

    #[error("{0}")]
    Domain(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TallyError>;
