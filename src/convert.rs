//! `serde_json::Value` <-> [`Value`] conversion.
//!
//! Plain JSON has no dates, regular expressions or predicates, so converting
//! to JSON renders them as strings (`"/src/flags"`, RFC 3339) or `null`.

use chrono::SecondsFormat;

use crate::{output::to_notation, value::Value};

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Converts a value into plain JSON.
pub fn to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null | Value::Predicate(_) => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Date(date) => {
            serde_json::Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Value::Regex(_) => serde_json::Value::String(to_notation(v)),
        Value::Array(arr) => serde_json::Value::Array(arr.iter().map(to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
    }
}
