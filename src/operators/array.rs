//! Operators that look at the whole target rather than at each element.

use crate::{error::OperatorViolation, value::Value};

use super::comparison::short_eq;

/// Array operators (`$in`, `$nin`, `$all`, `$size`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayOp {
    In,
    Nin,
    All,
    Size,
}

impl ArrayOp {
    pub const ALL: [ArrayOp; 4] = [ArrayOp::In, ArrayOp::Nin, ArrayOp::All, ArrayOp::Size];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ArrayOp::In => "$in",
            ArrayOp::Nin => "$nin",
            ArrayOp::All => "$all",
            ArrayOp::Size => "$size",
        }
    }

    /// Evaluates the operator against the raw target.
    ///
    /// A non-array target is treated as a one-element array by `$in`, `$nin`
    /// and `$all`. `$all` does not require the target to be an array, so a
    /// scalar satisfies it when every argument element equals that scalar.
    pub fn apply(self, target: Option<&Value>, argument: &Value) -> Result<bool, OperatorViolation> {
        match self {
            ArrayOp::In => Ok(contains_any(target, self.list(argument)?)),
            ArrayOp::Nin => Ok(!contains_any(target, self.list(argument)?)),
            ArrayOp::All => {
                let wanted = self.list(argument)?;
                let elements = elements(target);
                Ok(wanted
                    .iter()
                    .all(|w| elements.iter().any(|e| short_eq(*e, w))))
            }
            ArrayOp::Size => {
                let Some(size) = argument.as_float() else {
                    return Err(OperatorViolation::new(self.name(), "a number", argument));
                };
                Ok(match target {
                    Some(Value::Array(items)) => items.len() as f64 == size,
                    _ => false,
                })
            }
        }
    }

    fn list(self, argument: &Value) -> Result<&[Value], OperatorViolation> {
        match argument {
            Value::Array(items) => Ok(items),
            _ => Err(OperatorViolation::new(self.name(), "an array", argument)),
        }
    }
}

fn elements(target: Option<&Value>) -> Vec<Option<&Value>> {
    match target {
        Some(Value::Array(items)) => items.iter().map(Some).collect(),
        other => vec![other],
    }
}

fn contains_any(target: Option<&Value>, candidates: &[Value]) -> bool {
    let elements = elements(target);
    candidates
        .iter()
        .any(|c| elements.iter().any(|e| short_eq(*e, c)))
}
