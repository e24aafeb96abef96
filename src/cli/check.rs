//! Evaluate a document against a query, both given in notation

use tracing::info;

use super::CliError;
use crate::{Value, evaluate, parse, to_json, to_notation, to_notation_pretty};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query, in notation
    pub query: String,
    /// The document, in notation
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Print plain JSON instead of notation
    pub json: bool,
    /// Only validate the query syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Evaluation finished; an empty object means the document matched
    Mismatch(Value),
}

impl CheckResult {
    pub fn is_match(&self) -> bool {
        match self {
            CheckResult::SyntaxValid => true,
            CheckResult::Mismatch(Value::Object(map)) => map.is_empty(),
            CheckResult::Mismatch(_) => false,
        }
    }
}

/// Execute a querydiff check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = match parse(&options.query)? {
        Value::Object(map) => map,
        other => return Err(CliError::QueryNotObject(other.type_name())),
    };

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let document = parse(input)?;

    let mismatch = evaluate(&document, &query)?;
    info!(failed = mismatch.len(), "evaluated document");
    Ok(CheckResult::Mismatch(Value::Object(mismatch)))
}

/// Format a mismatch tree the way the options ask for
pub fn render(value: &Value, options: &CheckOptions) -> Result<String, CliError> {
    if options.json {
        let json = to_json(value);
        let text = if options.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        return Ok(text);
    }
    Ok(if options.pretty {
        to_notation_pretty(value)
    } else {
        to_notation(value)
    })
}
