//! Operator reference for the `operators` command

use crate::operators::{ArrayOp, ComparisonOp, Level, TopLevelOp};

fn comparison_summary(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Eq => "equal to the argument",
        ComparisonOp::Gt => "greater than the argument",
        ComparisonOp::Gte => "greater than or equal to the argument",
        ComparisonOp::Lt => "less than the argument",
        ComparisonOp::Lte => "less than or equal to the argument",
        ComparisonOp::Ne => "not equal to the argument",
        ComparisonOp::Exists => "present iff the argument is truthy",
        ComparisonOp::Mod => "[divisor, remainder]: value % divisor == remainder",
        ComparisonOp::Regex => "string matching the pattern (string or /regex/)",
    }
}

fn array_summary(op: ArrayOp) -> &'static str {
    match op {
        ArrayOp::In => "some element equals some argument element",
        ArrayOp::Nin => "no element equals any argument element",
        ArrayOp::All => "every argument element appears in the value",
        ArrayOp::Size => "array with exactly this many elements",
    }
}

fn top_level_summary(op: TopLevelOp) -> &'static str {
    match op {
        TopLevelOp::Or => "at least one sub-query matches",
        TopLevelOp::And => "every sub-query matches; reports only the failing ones",
        TopLevelOp::Nor => "no sub-query matches",
        TopLevelOp::Where => "expression over `this` is truthy (not inside $elemMatch)",
    }
}

/// The operator reference, grouped by the level where each operator is legal
pub fn operator_reference() -> String {
    let mut out = String::from("QUERYDIFF OPERATORS\n\n");

    out.push_str("TOP LEVEL (query root and sub-queries of $or/$and/$nor)\n\n");
    for op in TopLevelOp::ALL {
        out.push_str(&format!("  {:<12} {}\n", op.name(), top_level_summary(op)));
    }

    out.push_str("\nFIELD LEVEL, COMPARISON (applied to each element of an array value)\n\n");
    for op in ComparisonOp::ALL {
        out.push_str(&format!("  {:<12} {}\n", op.name(), comparison_summary(op)));
    }

    out.push_str("\nFIELD LEVEL, ARRAY (applied to the whole value)\n\n");
    for op in ArrayOp::ALL {
        out.push_str(&format!("  {:<12} {}\n", op.name(), array_summary(op)));
    }

    out.push_str("\nFIELD LEVEL, STRUCTURAL\n\n");
    out.push_str(&format!("  {:<12} {}\n", "$not", "the sub-expression does not match"));
    out.push_str(&format!(
        "  {:<12} {}\n",
        "$elemMatch", "some array element matches the sub-query"
    ));

    out.push_str(&format!(
        "\nINSIDE $elemMatch\n\n  {}\n",
        Level::ElemMatch.operator_names().join(" ")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_operator() {
        let reference = operator_reference();
        for name in Level::Low.operator_names() {
            assert!(reference.contains(name), "missing {name}");
        }
        assert!(reference.contains("$where"));
    }
}
