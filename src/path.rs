//! Dotted field paths such as `a.b.0.c`.

use crate::value::Value;

/// Walks `path` from `target`. Objects are stepped into by key and arrays by
/// non-negative decimal index; a missing segment yields `None` rather than an
/// error.
pub fn resolve<'a>(target: Option<&'a Value>, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(target?, |current, segment| step(current, segment))
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        _ => None,
    }
}
