//! Notation output for values and mismatch trees.
//!
//! The printer writes the same tolerant notation the parser reads, so a
//! mismatch tree can be pasted back as a query. Regular expressions print as
//! literals, dates as `ISODate(...)`, and objects keep their insertion order.
//!
//! # Examples
//!
//! ```
//! use querydiff::{parse, to_notation, to_notation_pretty};
//!
//! let value = parse("{a: {$regex: /^x/i}}").unwrap();
//! assert_eq!(to_notation(&value), r#"{"a":{"$regex":/^x/i}}"#);
//! assert_eq!(
//!     to_notation_pretty(&value),
//!     "{\n  \"a\": {\n    \"$regex\": /^x/i\n  }\n}"
//! );
//! ```

use chrono::SecondsFormat;

use crate::value::{Map, Value};

pub struct NotationPrinter {
    pretty: bool,
}

impl NotationPrinter {
    pub fn new(pretty: bool) -> Self {
        NotationPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => print_float(*n),
            Value::String(s) => format!("\"{}\"", escape_string(s)),
            Value::Date(date) => format!(
                "ISODate(\"{}\")",
                date.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            Value::Regex(pattern) => format!(
                "/{}/{}",
                pattern.source().replace('/', "\\/"),
                pattern.flags()
            ),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
            Value::Predicate(_) => "[predicate]".to_string(),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        let items: Vec<String> = arr
            .iter()
            .map(|v| {
                if self.pretty {
                    format!("{}{}", self.indent(indent + 1), self.print_value(v, indent + 1))
                } else {
                    self.print_value(v, indent)
                }
            })
            .collect();
        self.wrap('[', items, ']', indent)
    }

    fn print_object(&self, obj: &Map, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        let items: Vec<String> = obj
            .iter()
            .map(|(k, v)| {
                if self.pretty {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                } else {
                    format!("\"{}\":{}", escape_string(k), self.print_value(v, indent))
                }
            })
            .collect();
        self.wrap('{', items, '}', indent)
    }

    fn wrap(&self, open: char, items: Vec<String>, close: char, indent: usize) -> String {
        if self.pretty {
            format!(
                "{open}\n{}\n{}{close}",
                items.join(",\n"),
                self.indent(indent)
            )
        } else {
            format!("{open}{}{close}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

fn print_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        n.to_string()
    }
}

fn escape_string(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec!['\\', 't'],
            c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
            c => vec![c],
        })
        .collect()
}

/// Compact notation, no whitespace.
pub fn to_notation(value: &Value) -> String {
    NotationPrinter::new(false).print(value)
}

/// Notation with 2-space indentation, one entry per line.
pub fn to_notation_pretty(value: &Value) -> String {
    NotationPrinter::new(true).print(value)
}
