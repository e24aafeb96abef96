//! Operator tables for the three evaluation levels.
//!
//! Each level has a closed set of operators, resolved by name with an
//! exhaustive `match`. The tables are plain code: nothing is registered at
//! runtime, so they can be shared freely between threads.
//!
//! | Level        | Operators                                                       |
//! |--------------|-----------------------------------------------------------------|
//! | top          | `$or` `$and` `$nor` `$where`                                    |
//! | low          | comparison + array operators, `$not`, `$elemMatch`              |
//! | `$elemMatch` | everything from both levels except `$where`                     |

pub mod array;
pub mod comparison;

pub use array::ArrayOp;
pub use comparison::{Comparison, ComparisonOp, short_eq};

use crate::value::Value;

/// Operators accepted as the keys of an operator bag under a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowLevelOp {
    Comparison(ComparisonOp),
    Array(ArrayOp),
    Not,
    ElemMatch,
}

impl LowLevelOp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "$not" => Some(LowLevelOp::Not),
            "$elemMatch" => Some(LowLevelOp::ElemMatch),
            _ => ComparisonOp::from_name(name)
                .map(LowLevelOp::Comparison)
                .or_else(|| ArrayOp::from_name(name).map(LowLevelOp::Array)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LowLevelOp::Comparison(op) => op.name(),
            LowLevelOp::Array(op) => op.name(),
            LowLevelOp::Not => "$not",
            LowLevelOp::ElemMatch => "$elemMatch",
        }
    }

    pub fn all() -> impl Iterator<Item = LowLevelOp> {
        ComparisonOp::ALL
            .into_iter()
            .map(LowLevelOp::Comparison)
            .chain(ArrayOp::ALL.into_iter().map(LowLevelOp::Array))
            .chain([LowLevelOp::Not, LowLevelOp::ElemMatch])
    }
}

/// Operators accepted at the root of a query (and inside `$or`/`$and`/`$nor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevelOp {
    Or,
    And,
    Nor,
    Where,
}

impl TopLevelOp {
    pub const ALL: [TopLevelOp; 4] = [
        TopLevelOp::Or,
        TopLevelOp::And,
        TopLevelOp::Nor,
        TopLevelOp::Where,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            TopLevelOp::Or => "$or",
            TopLevelOp::And => "$and",
            TopLevelOp::Nor => "$nor",
            TopLevelOp::Where => "$where",
        }
    }
}

/// Operators as seen from inside an `$elemMatch` sub-query.
///
/// `from_name` still resolves `$where`; the evaluator rejects it with a
/// dedicated message instead of treating it as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemMatchOp {
    TopLevel(TopLevelOp),
    LowLevel(LowLevelOp),
}

impl ElemMatchOp {
    pub fn from_name(name: &str) -> Option<Self> {
        TopLevelOp::from_name(name)
            .map(ElemMatchOp::TopLevel)
            .or_else(|| LowLevelOp::from_name(name).map(ElemMatchOp::LowLevel))
    }

    pub fn all() -> impl Iterator<Item = ElemMatchOp> {
        TopLevelOp::ALL
            .into_iter()
            .filter(|op| *op != TopLevelOp::Where)
            .map(ElemMatchOp::TopLevel)
            .chain(LowLevelOp::all().map(ElemMatchOp::LowLevel))
    }

    pub fn name(self) -> &'static str {
        match self {
            ElemMatchOp::TopLevel(op) => op.name(),
            ElemMatchOp::LowLevel(op) => op.name(),
        }
    }
}

/// Structural position of a query node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Top,
    Low,
    ElemMatch,
}

impl Level {
    /// Operator names legal at this level, for diagnostics.
    pub fn operator_names(self) -> Vec<&'static str> {
        match self {
            Level::Top => TopLevelOp::ALL.iter().map(|op| op.name()).collect(),
            Level::Low => LowLevelOp::all().map(LowLevelOp::name).collect(),
            Level::ElemMatch => ElemMatchOp::all().map(ElemMatchOp::name).collect(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Level::Top => "top level",
            Level::Low => "field level",
            Level::ElemMatch => "$elemMatch level",
        }
    }
}

/// Applies a per-element test with existential quantification over arrays:
/// an array target passes when at least one element passes, any other target
/// is tested once.
pub fn broadcast(target: Option<&Value>, test: impl Fn(Option<&Value>) -> bool) -> bool {
    match target {
        Some(Value::Array(items)) => items.iter().any(|item| test(Some(item))),
        _ => test(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_partition_operators() {
        assert_eq!(LowLevelOp::from_name("$or"), None);
        assert_eq!(TopLevelOp::from_name("$gt"), None);
        assert_eq!(
            ElemMatchOp::from_name("$size"),
            Some(ElemMatchOp::LowLevel(LowLevelOp::Array(ArrayOp::Size)))
        );
        assert_eq!(
            ElemMatchOp::from_name("$where"),
            Some(ElemMatchOp::TopLevel(TopLevelOp::Where))
        );
        assert!(!Level::ElemMatch.operator_names().contains(&"$where"));
        assert_eq!(Level::Low.operator_names().len(), 15);
    }

    #[test]
    fn broadcast_is_existential() {
        let items = Value::Array(vec![Value::Integer(1), Value::Integer(5)]);
        assert!(broadcast(Some(&items), |e| e == Some(&Value::Integer(5))));
        assert!(!broadcast(Some(&Value::Array(vec![])), |_| true));
        assert!(broadcast(None, |e| e.is_none()));
    }
}
