use thiserror::Error;
use tracing::debug;

use crate::value::Value;

/// The single error raised while evaluating a query.
///
/// It always means the query is malformed: an operator received an argument of
/// the wrong shape, or an operator was used at a level where it is not allowed.
/// It is never recovered from inside the engine.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid use of {operator}: expected {expected}, received {received}")]
pub struct OperatorViolation {
    /// Operator name as written in the query, e.g. `$mod`
    pub operator: String,
    /// Description of the argument shape or placement that is accepted
    pub expected: String,
    /// The argument actually found in the query
    pub received: Value,
}

impl OperatorViolation {
    pub fn new(operator: impl Into<String>, expected: impl Into<String>, received: &Value) -> Self {
        let violation = OperatorViolation {
            operator: operator.into(),
            expected: expected.into(),
            received: received.clone(),
        };
        debug!(operator = %violation.operator, expected = %violation.expected, "operator violation");
        violation
    }
}

/// Errors from compiling a regular expression with JavaScript-style flags.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("unsupported regex flag '{0}'")]
    UnknownFlag(char),

    #[error("invalid regex: {0}")]
    Invalid(#[from] regex::Error),
}
