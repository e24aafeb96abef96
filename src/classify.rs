//! Shape checks that decide how a query node is interpreted.

use crate::value::{Map, Value};

/// Values compared by direct equality rather than recursed into as field maps.
pub fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::Date(_)
            | Value::Array(_)
            | Value::Boolean(_)
            | Value::Regex(_)
    )
}

/// `$` followed by at least one character. Says nothing about whether the
/// operator is actually known.
pub fn looks_like_operator(key: &str) -> bool {
    key.len() > 1 && key.starts_with('$')
}

/// An object whose keys all look like operators, i.e. an operator bag.
///
/// The empty object qualifies: it is an operator bag with no clauses.
pub fn is_query_expression(value: &Value) -> bool {
    as_query_expression(value).is_some()
}

pub(crate) fn as_query_expression(value: &Value) -> Option<&Map> {
    if is_primitive(value) {
        return None;
    }
    value
        .as_object()
        .filter(|map| map.keys().all(|key| looks_like_operator(key)))
}
