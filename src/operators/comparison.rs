//! Per-element comparison operators.

use std::{borrow::Cow, cmp::Ordering};

use crate::{
    error::OperatorViolation,
    value::{Pattern, Value},
};

/// Comparison operators (`$eq`, `$gt`, `$gte`, `$lt`, `$lte`, `$ne`,
/// `$exists`, `$mod`, `$regex`).
///
/// Each one tests a single element; the evaluator broadcasts them over array
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    Exists,
    Mod,
    Regex,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 9] = [
        ComparisonOp::Eq,
        ComparisonOp::Gt,
        ComparisonOp::Gte,
        ComparisonOp::Lt,
        ComparisonOp::Lte,
        ComparisonOp::Ne,
        ComparisonOp::Exists,
        ComparisonOp::Mod,
        ComparisonOp::Regex,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "$eq",
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Ne => "$ne",
            ComparisonOp::Exists => "$exists",
            ComparisonOp::Mod => "$mod",
            ComparisonOp::Regex => "$regex",
        }
    }

    /// Validates `argument` and returns the clause ready to test elements.
    pub fn prepare(self, argument: &Value) -> Result<Comparison<'_>, OperatorViolation> {
        Ok(match self {
            ComparisonOp::Eq => Comparison::Eq(argument),
            ComparisonOp::Ne => Comparison::Ne(argument),
            ComparisonOp::Gt => Comparison::Ordered(argument, |o| o == Ordering::Greater),
            ComparisonOp::Gte => Comparison::Ordered(argument, |o| o != Ordering::Less),
            ComparisonOp::Lt => Comparison::Ordered(argument, |o| o == Ordering::Less),
            ComparisonOp::Lte => Comparison::Ordered(argument, |o| o != Ordering::Greater),
            ComparisonOp::Exists => Comparison::Exists(argument.is_truthy()),
            ComparisonOp::Mod => match argument {
                Value::Array(pair)
                    if pair.len() == 2 && pair[0].is_number() && pair[1].is_number() =>
                {
                    Comparison::Mod {
                        divisor: &pair[0],
                        remainder: &pair[1],
                    }
                }
                _ => {
                    return Err(OperatorViolation::new(
                        self.name(),
                        "an array of two numbers [divisor, remainder]",
                        argument,
                    ));
                }
            },
            ComparisonOp::Regex => match argument {
                Value::Regex(pattern) => Comparison::Regex(Cow::Borrowed(pattern)),
                Value::String(source) => {
                    let pattern = Pattern::new(source, "").map_err(|e| {
                        OperatorViolation::new(
                            self.name(),
                            format!("a valid regular expression ({e})"),
                            argument,
                        )
                    })?;
                    Comparison::Regex(Cow::Owned(pattern))
                }
                _ => {
                    return Err(OperatorViolation::new(
                        self.name(),
                        "a string or a regular expression",
                        argument,
                    ));
                }
            },
        })
    }
}

/// A validated comparison clause.
#[derive(Debug, Clone)]
pub enum Comparison<'q> {
    Eq(&'q Value),
    Ne(&'q Value),
    Ordered(&'q Value, fn(Ordering) -> bool),
    Exists(bool),
    Mod {
        divisor: &'q Value,
        remainder: &'q Value,
    },
    Regex(Cow<'q, Pattern>),
}

impl Comparison<'_> {
    /// Whether a single element (`None` when absent) satisfies the clause.
    pub fn test(&self, element: Option<&Value>) -> bool {
        match self {
            Comparison::Eq(argument) => element.is_some_and(|e| e.deep_eq(argument)),
            Comparison::Ne(argument) => !element.is_some_and(|e| e.deep_eq(argument)),
            Comparison::Ordered(argument, accept) => element
                .and_then(|e| e.compare(argument))
                .is_some_and(|ordering| accept(ordering)),
            Comparison::Exists(expected) => element.is_some() == *expected,
            Comparison::Mod { divisor, remainder } => {
                element.is_some_and(|e| modulo_matches(e, divisor, remainder))
            }
            Comparison::Regex(pattern) => {
                matches!(element, Some(Value::String(s)) if pattern.is_match(s))
            }
        }
    }
}

/// Literal equality shorthand: a regex argument is tested against string
/// elements, anything else is compared with [`Value::deep_eq`].
pub fn short_eq(element: Option<&Value>, argument: &Value) -> bool {
    match argument {
        Value::Regex(pattern) => matches!(element, Some(Value::String(s)) if pattern.is_match(s)),
        _ => element.is_some_and(|e| e.deep_eq(argument)),
    }
}

/// `element % divisor == remainder` with truncated remainder semantics.
/// Two integers use integer remainder; any float operand switches to `f64`
/// remainder. Non-numeric elements and a zero divisor never match.
fn modulo_matches(element: &Value, divisor: &Value, remainder: &Value) -> bool {
    if let (Value::Integer(e), Value::Integer(d)) = (element, divisor) {
        return *d != 0 && Value::Integer(e.wrapping_rem(*d)).deep_eq(remainder);
    }

    let (Some(e), Some(d)) = (element.as_float(), divisor.as_float()) else {
        return false;
    };
    d != 0.0 && Value::Float(e % d).deep_eq(remainder)
}
