use std::{cmp::Ordering, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Object representation. Insertion order is kept so that mismatch trees list
/// their keys in the same order as the query they were pruned from.
pub type Map = IndexMap<String, Value>;

/// A document or query value.
///
/// Covers the JSON types plus the extras a query document can carry: dates,
/// regular expressions and typed `$where` predicates. Integers and floats are
/// kept apart but compare numerically.
///
/// A field that is missing from a document is not a `Value`; the engine passes
/// it around as `Option<&Value>::None`.
///
/// # Examples
///
/// ```
/// use querydiff::{Map, Value};
///
/// let mut obj = Map::new();
/// obj.insert("qty".to_string(), Value::Integer(3));
/// let doc = Value::Object(obj);
///
/// assert_eq!(doc.type_name(), "object");
/// assert!(Value::Integer(3).deep_eq(&Value::Float(3.0)));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Point in time, always normalised to UTC
    Date(DateTime<Utc>),

    /// Regular expression with its original source and flags
    Regex(Pattern),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys, in insertion order
    Object(Map),

    /// Host-supplied predicate, only meaningful as a `$where` argument
    Predicate(Predicate),
}

impl Value {
    /// JavaScript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy,
    /// everything else (including empty arrays and objects) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Date(_)
            | Value::Regex(_)
            | Value::Array(_)
            | Value::Object(_)
            | Value::Predicate(_) => true,
        }
    }

    /// Human-readable type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Regex(_) => "regex",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Predicate(_) => "predicate",
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Structural, order-sensitive equality.
    ///
    /// Arrays compare element by element; objects compare key by key in
    /// insertion order, so `{a: 1, b: 2}` and `{b: 2, a: 1}` differ. Integers
    /// and floats compare by numeric value.
    pub fn deep_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                self.as_float() == other.as_float()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.deep_eq(vb))
            }
            (Value::Predicate(a), Value::Predicate(b)) => a == b,
            _ => false,
        }
    }

    /// Native ordering between two values.
    ///
    /// Numbers order with numbers, strings lexicographically, dates
    /// chronologically and booleans `false < true`. Any other pairing is
    /// unordered and yields `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                self.as_float()?.partial_cmp(&other.as_float()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::output::to_notation(self))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Value::Date(date)
    }
}

impl From<Pattern> for Value {
    fn from(pattern: Pattern) -> Self {
        Value::Regex(pattern)
    }
}

impl From<Predicate> for Value {
    fn from(predicate: Predicate) -> Self {
        Value::Predicate(predicate)
    }
}

/// A compiled regular expression that remembers how it was written.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` with JavaScript-style `flags`.
    ///
    /// `i`, `m`, `s` and `x` switch the matching regex options; `g`, `u` and `y`
    /// only affect iteration in JavaScript and are accepted without effect.
    /// Lookaround and backreferences are not supported by the engine and fail
    /// with [`PatternError::Invalid`].
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'g' | 'u' | 'y' => &mut builder,
                other => return Err(PatternError::UnknownFlag(other)),
            };
        }
        Ok(Pattern {
            source: source.to_string(),
            flags: flags.to_string(),
            regex: builder.build()?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Typed `$where` predicate over the document under test.
///
/// Two predicates are equal only when they share the same closure.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Predicate(Arc::new(f))
    }

    pub fn test(&self, document: &Value) -> bool {
        (self.0)(document)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}
