//! CLI support for querydiff
//!
//! Provides programmatic access to the `querydiff` commands so they can be
//! embedded in other tools (editors, test harnesses) without spawning a
//! process.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check, render};
pub use docs::operator_reference;

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Query or document could not be read
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    /// Query is malformed
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::OperatorViolation),

    /// JSON rendering failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The query parsed but is not an object
    #[error("Query must be an object, got {0}")]
    QueryNotObject(&'static str),

    #[error("No input provided. Use --input or pipe a document to stdin.")]
    NoInput,
}
