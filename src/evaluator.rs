//! The matching engine.
//!
//! A query is walked at three levels, decided by where a node sits in the
//! query:
//!
//! - **top level**: the query root and every sub-query of `$or`/`$and`/`$nor`.
//!   Keys are field paths or top-level operators.
//! - **low level**: the node paired with a field path. Either a literal,
//!   compared with the equality shorthand, or an operator bag.
//! - **`$elemMatch` level**: the sub-query applied to each array element.
//!   Like the top level, but low-level operators are allowed too and `$where`
//!   is not.
//!
//! Instead of a boolean, every level produces a mismatch: a copy of the query
//! pruned down to the clauses that failed. A clause that fails reports its
//! original argument (or, for nested clauses, its own pruned sub-tree), with
//! one exception: `$and` reports the list of its failing sub-query mismatches.

use tracing::{debug, trace};

use crate::{
    classify::{as_query_expression, looks_like_operator},
    error::OperatorViolation,
    operators::{ElemMatchOp, Level, LowLevelOp, TopLevelOp, broadcast, short_eq},
    path,
    value::{Map, Value},
    where_clause::WhereExpr,
};

/// Result of evaluating one clause: `None` when it matched, otherwise the
/// mismatch to report under the clause's key.
type Outcome = Option<Value>;

/// Evaluates `document` against `query` and returns the mismatch tree.
///
/// An empty map means the document satisfies the query. Evaluation stops at
/// the first malformed operator; no partial tree is returned in that case.
///
/// # Examples
///
/// ```
/// use querydiff::{evaluate, parse};
///
/// let doc = parse("{a: 1, b: 2}").unwrap();
/// let query = parse("{$and: [{a: 2}, {b: 2}]}").unwrap();
///
/// let mismatch = evaluate(&doc, query.as_object().unwrap()).unwrap();
/// assert_eq!(mismatch.get("$and"), Some(&parse("[{a: 2}]").unwrap()));
/// ```
pub fn evaluate(document: &Value, query: &Map) -> Result<Map, OperatorViolation> {
    let mismatch = match_top_level(document, query)?;
    if !mismatch.is_empty() {
        debug!(failed = mismatch.len(), "document does not match query");
    }
    Ok(mismatch)
}

/// Boolean form of [`evaluate`].
pub fn matches(document: &Value, query: &Map) -> Result<bool, OperatorViolation> {
    Ok(evaluate(document, query)?.is_empty())
}

fn match_top_level(target: &Value, query: &Map) -> Result<Map, OperatorViolation> {
    collect(query, |key, node| {
        if looks_like_operator(key) {
            let op = TopLevelOp::from_name(key).ok_or_else(|| misplaced(key, Level::Top, node))?;
            apply_top_level(op, target, node)
        } else {
            match_low_level(path::resolve(Some(target), key), node)
        }
    })
}

fn match_low_level(target: Option<&Value>, node: &Value) -> Result<Outcome, OperatorViolation> {
    let Some(operators) = as_query_expression(node) else {
        return Ok(leaf(short_eq(target, node), node));
    };

    let mismatch = collect(operators, |key, argument| {
        let op = LowLevelOp::from_name(key).ok_or_else(|| misplaced(key, Level::Low, argument))?;
        apply_low_level(op, target, argument)
    })?;
    Ok(non_empty(mismatch))
}

fn match_elem_match_level(target: &Value, query: &Map) -> Result<Map, OperatorViolation> {
    collect(query, |key, node| {
        if !looks_like_operator(key) {
            return match_low_level(path::resolve(Some(target), key), node);
        }
        match ElemMatchOp::from_name(key) {
            Some(ElemMatchOp::TopLevel(TopLevelOp::Where)) => Err(OperatorViolation::new(
                key,
                "an operator other than $where inside $elemMatch",
                node,
            )),
            Some(ElemMatchOp::TopLevel(op)) => apply_top_level(op, target, node),
            Some(ElemMatchOp::LowLevel(op)) => apply_low_level(op, Some(target), node),
            None => Err(misplaced(key, Level::ElemMatch, node)),
        }
    })
}

fn apply_low_level(
    op: LowLevelOp,
    target: Option<&Value>,
    argument: &Value,
) -> Result<Outcome, OperatorViolation> {
    trace!(operator = op.name(), "applying field-level operator");
    match op {
        LowLevelOp::Comparison(op) => {
            let clause = op.prepare(argument)?;
            Ok(leaf(broadcast(target, |e| clause.test(e)), argument))
        }
        LowLevelOp::Array(op) => Ok(leaf(op.apply(target, argument)?, argument)),
        LowLevelOp::Not => {
            let inner = match_low_level(target, argument)?;
            Ok(leaf(inner.is_some(), argument))
        }
        LowLevelOp::ElemMatch => elem_match(target, argument),
    }
}

fn elem_match(target: Option<&Value>, argument: &Value) -> Result<Outcome, OperatorViolation> {
    let Value::Object(subquery) = argument else {
        return Err(OperatorViolation::new(
            LowLevelOp::ElemMatch.name(),
            "an object",
            argument,
        ));
    };
    let Some(Value::Array(items)) = target else {
        return Ok(Some(argument.clone()));
    };

    for item in items {
        if match_elem_match_level(item, subquery)?.is_empty() {
            return Ok(None);
        }
    }
    Ok(Some(argument.clone()))
}

fn apply_top_level(op: TopLevelOp, target: &Value, argument: &Value) -> Result<Outcome, OperatorViolation> {
    trace!(operator = op.name(), "applying top-level operator");
    match op {
        TopLevelOp::Or => {
            for clause in clauses(op, argument)? {
                if match_top_level(target, clause)?.is_empty() {
                    return Ok(None);
                }
            }
            Ok(Some(argument.clone()))
        }
        TopLevelOp::And => {
            let mut failed = Vec::new();
            for clause in clauses(op, argument)? {
                let mismatch = match_top_level(target, clause)?;
                if !mismatch.is_empty() {
                    failed.push(Value::Object(mismatch));
                }
            }
            Ok((!failed.is_empty()).then_some(Value::Array(failed)))
        }
        TopLevelOp::Nor => {
            for clause in clauses(op, argument)? {
                if match_top_level(target, clause)?.is_empty() {
                    return Ok(Some(argument.clone()));
                }
            }
            Ok(None)
        }
        TopLevelOp::Where => Ok(leaf(where_holds(target, argument)?, argument)),
    }
}

/// Sub-queries of `$or`, `$and` and `$nor`: a non-empty array of objects.
fn clauses(op: TopLevelOp, argument: &Value) -> Result<Vec<&Map>, OperatorViolation> {
    let invalid = || OperatorViolation::new(op.name(), "a non-empty array of query objects", argument);
    match argument {
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| item.as_object().ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn where_holds(target: &Value, argument: &Value) -> Result<bool, OperatorViolation> {
    match argument {
        Value::Predicate(predicate) => Ok(predicate.test(target)),
        Value::String(source) => {
            let expr = WhereExpr::parse(source).map_err(|e| {
                OperatorViolation::new(
                    TopLevelOp::Where.name(),
                    format!("a predicate or a valid expression string ({e})"),
                    argument,
                )
            })?;
            Ok(expr.holds(target))
        }
        _ => Err(OperatorViolation::new(
            TopLevelOp::Where.name(),
            "a predicate or an expression string",
            argument,
        )),
    }
}

/// Runs `clause` for every entry of `query`, keeping only the failures.
fn collect(
    query: &Map,
    mut clause: impl FnMut(&str, &Value) -> Result<Outcome, OperatorViolation>,
) -> Result<Map, OperatorViolation> {
    let mut mismatch = Map::new();
    for (key, node) in query {
        if let Some(failure) = clause(key, node)? {
            mismatch.insert(key.clone(), failure);
        }
    }
    Ok(mismatch)
}

fn leaf(matched: bool, argument: &Value) -> Outcome {
    (!matched).then(|| argument.clone())
}

fn non_empty(mismatch: Map) -> Outcome {
    (!mismatch.is_empty()).then_some(Value::Object(mismatch))
}

fn misplaced(key: &str, level: Level, argument: &Value) -> OperatorViolation {
    let allowed = level.operator_names().join(", ");
    let expected = match level {
        Level::Low => format!("one of the {} operators ({allowed})", level.describe()),
        Level::Top | Level::ElemMatch => {
            format!("a field name or one of the {} operators ({allowed})", level.describe())
        }
    };
    OperatorViolation::new(key, expected, argument)
}
