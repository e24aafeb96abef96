use querydiff::{Map, OperatorViolation, Predicate, Value, evaluate, matches, parse};

fn eval(doc: &str, query: &str) -> Result<Value, OperatorViolation> {
    let doc = parse(doc).unwrap();
    let query = parse(query).unwrap();
    evaluate(&doc, query.as_object().unwrap()).map(Value::Object)
}

fn mismatch(doc: &str, query: &str) -> Value {
    eval(doc, query).unwrap()
}

fn violation(doc: &str, query: &str) -> OperatorViolation {
    eval(doc, query).unwrap_err()
}

fn notation(text: &str) -> Value {
    parse(text).unwrap()
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_literal_mismatch_reports_literal() {
    assert_eq!(mismatch("{a: 2}", "{a: 1}"), notation("{a: 1}"));
}

#[test]
fn test_nested_literal_object_matches() {
    assert_eq!(mismatch("{a: {b: 3, c: 1}}", "{a: {b: 3, c: 1}}"), notation("{}"));
}

#[test]
fn test_in_against_array_target() {
    assert_eq!(mismatch("{a: [1, 2]}", "{a: {$in: [2, 3]}}"), notation("{}"));
}

#[test]
fn test_and_reports_only_failing_conjuncts() {
    assert_eq!(
        mismatch("{a: 1, b: 2}", "{$and: [{a: 2}, {b: 2}]}"),
        notation("{$and: [{a: 2}]}")
    );
}

#[test]
fn test_elem_match_without_qualifying_element() {
    assert_eq!(
        mismatch("{a: [{a: 1}, {a: 2}]}", "{a: {$elemMatch: {a: {$gt: 5}}}}"),
        notation("{a: {$elemMatch: {a: {$gt: 5}}}}")
    );
}

#[test]
fn test_mod_with_wrong_arity_raises() {
    let err = violation("{a: 1}", "{a: {$mod: [1, 3, 4]}}");
    assert_eq!(err.operator, "$mod");
    assert_eq!(err.received, notation("[1, 3, 4]"));
}

// ============================================================================
// Field selection
// ============================================================================

#[test]
fn test_empty_query_matches_everything() {
    assert_eq!(mismatch("{a: 1}", "{}"), notation("{}"));
}

#[test]
fn test_dotted_paths() {
    assert_eq!(mismatch("{a: {c: 5}}", "{'a.c': 5}"), notation("{}"));
    assert_eq!(mismatch("{a: {c: 5}}", "{'a.c': 6}"), notation("{'a.c': 6}"));
    assert_eq!(mismatch("{a: [{c: 1}, {c: 2}]}", "{'a.1.c': 2}"), notation("{}"));
}

#[test]
fn test_missing_field_is_not_an_error() {
    assert_eq!(mismatch("{}", "{a: {$exists: false}}"), notation("{}"));
    assert_eq!(
        mismatch("{}", "{a: {$exists: true}}"),
        notation("{a: {$exists: true}}")
    );
    assert_eq!(mismatch("{}", "{'a.b.c': {$gt: 1}}"), notation("{'a.b.c': {$gt: 1}}"));
    assert_eq!(mismatch("{}", "{a: null}"), notation("{a: null}"));
}

#[test]
fn test_only_failed_operators_are_kept() {
    assert_eq!(
        mismatch("{a: 5, b: 1}", "{a: {$gt: 1, $lt: 3}, b: 1}"),
        notation("{a: {$lt: 3}}")
    );
}

#[test]
fn test_result_follows_query_key_order() {
    let result = mismatch("{}", "{z: 1, a: 2, m: 3}");
    let keys: Vec<_> = result.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn test_literal_is_not_broadcast_over_arrays() {
    assert_eq!(mismatch("{a: [1, 2]}", "{a: 1}"), notation("{a: 1}"));
    assert_eq!(mismatch("{a: [1, 2]}", "{a: [1, 2]}"), notation("{}"));
    assert_eq!(mismatch("{a: [1, 2]}", "{a: [2, 1]}"), notation("{a: [2, 1]}"));
}

#[test]
fn test_literal_objects_compare_in_key_order() {
    assert_eq!(
        mismatch("{a: {b: 1, c: 2}}", "{a: {c: 2, b: 1}}"),
        notation("{a: {c: 2, b: 1}}")
    );
}

#[test]
fn test_object_with_mixed_keys_is_a_literal() {
    assert_eq!(mismatch("{a: {$gt: 1, b: 2}}", "{a: {$gt: 1, b: 2}}"), notation("{}"));
    assert_eq!(
        mismatch("{a: 5}", "{a: {$gt: 1, b: 2}}"),
        notation("{a: {$gt: 1, b: 2}}")
    );
}

#[test]
fn test_empty_operator_bag_matches() {
    assert_eq!(mismatch("{a: 1}", "{a: {}}"), notation("{}"));
}

#[test]
fn test_regex_shorthand() {
    assert_eq!(mismatch("{name: 'alice'}", "{name: /^al/}"), notation("{}"));
    assert_eq!(
        mismatch("{name: 'alice'}", "{name: /^AL/}"),
        notation("{name: /^AL/}")
    );
    assert_eq!(mismatch("{name: 'alice'}", "{name: /^AL/i}"), notation("{}"));
    assert_eq!(mismatch("{name: 7}", "{name: /7/}"), notation("{name: /7/}"));
}

#[test]
fn test_dates_compare_chronologically() {
    let doc = "{d: ISODate('2020-01-02')}";
    assert_eq!(mismatch(doc, "{d: {$gt: ISODate('2020-01-01')}}"), notation("{}"));
    assert_eq!(mismatch(doc, "{d: ISODate('2020-01-02T00:00:00Z')}"), notation("{}"));
    assert_eq!(
        mismatch(doc, "{d: {$lt: ISODate('2020-01-01')}}"),
        notation("{d: {$lt: ISODate('2020-01-01')}}")
    );
}

// ============================================================================
// Structural operators
// ============================================================================

#[test]
fn test_not_inverts_sub_expression() {
    assert_eq!(
        mismatch("{a: 5}", "{a: {$not: {$gt: 3}}}"),
        notation("{a: {$not: {$gt: 3}}}")
    );
    assert_eq!(mismatch("{a: 5}", "{a: {$not: {$gt: 7}}}"), notation("{}"));
    assert_eq!(mismatch("{a: 5}", "{a: {$not: 6}}"), notation("{}"));
    assert_eq!(mismatch("{a: 'xyz'}", "{a: {$not: /^x/}}"), notation("{a: {$not: /^x/}}"));
}

#[test]
fn test_negation_law() {
    let cases = [
        ("{a: 5}", "{$gt: 3}"),
        ("{a: 5}", "{$gt: 3, $lt: 4}"),
        ("{a: [1, 2]}", "{$in: [3]}"),
        ("{a: [1, 2]}", "[1, 2]"),
        ("{}", "{$exists: true}"),
        ("{a: [{b: 1}]}", "{$elemMatch: {b: 1}}"),
        ("{a: 'abc'}", "/b/"),
        ("{a: 3}", "{$not: {$gt: 2}}"),
    ];
    for (doc, q) in cases {
        let plain = mismatch(doc, &format!("{{a: {q}}}"));
        let negated = mismatch(doc, &format!("{{a: {{$not: {q}}}}}"));
        let plain_empty = plain.as_object().unwrap().is_empty();
        let negated_empty = negated.as_object().unwrap().is_empty();
        assert_ne!(plain_empty, negated_empty, "doc {doc}, sub-expression {q}");
    }
}

#[test]
fn test_elem_match_on_non_array_fails() {
    assert_eq!(
        mismatch("{a: 5}", "{a: {$elemMatch: {$gt: 1}}}"),
        notation("{a: {$elemMatch: {$gt: 1}}}")
    );
    assert_eq!(
        mismatch("{}", "{a: {$elemMatch: {b: 1}}}"),
        notation("{a: {$elemMatch: {b: 1}}}")
    );
}

#[test]
fn test_elem_match_with_operators_on_elements() {
    assert_eq!(mismatch("{a: [1, 5]}", "{a: {$elemMatch: {$gt: 4, $lt: 6}}}"), notation("{}"));
    assert_eq!(
        mismatch("{a: [1, 5]}", "{a: {$elemMatch: {$gt: 5}}}"),
        notation("{a: {$elemMatch: {$gt: 5}}}")
    );
}

#[test]
fn test_elem_match_requires_one_element_to_satisfy_all_clauses() {
    let doc = "{items: [{qty: 1, sku: 'a'}, {qty: 9, sku: 'b'}]}";
    assert_eq!(
        mismatch(doc, "{items: {$elemMatch: {qty: {$gt: 5}, sku: 'b'}}}"),
        notation("{}")
    );
    assert_eq!(
        mismatch(doc, "{items: {$elemMatch: {qty: {$gt: 5}, sku: 'a'}}}"),
        notation("{items: {$elemMatch: {qty: {$gt: 5}, sku: 'a'}}}")
    );
}

#[test]
fn test_elem_match_accepts_logical_operators() {
    assert_eq!(
        mismatch("{a: [{b: 1}, {b: 2}]}", "{a: {$elemMatch: {$or: [{b: 2}, {b: 3}]}}}"),
        notation("{}")
    );
}

#[test]
fn test_elem_match_argument_must_be_object() {
    let err = violation("{a: [1]}", "{a: {$elemMatch: 5}}");
    assert_eq!(err.operator, "$elemMatch");
    assert_eq!(err.received, Value::Integer(5));
}

// ============================================================================
// Top-level operators
// ============================================================================

#[test]
fn test_or() {
    assert_eq!(
        mismatch("{a: 1}", "{$or: [{a: 2}, {a: 3}]}"),
        notation("{$or: [{a: 2}, {a: 3}]}")
    );
    assert_eq!(mismatch("{a: 1}", "{$or: [{a: 2}, {a: 1}]}"), notation("{}"));
}

#[test]
fn test_nor() {
    assert_eq!(
        mismatch("{a: 1}", "{$nor: [{a: 2}, {a: 1}]}"),
        notation("{$nor: [{a: 2}, {a: 1}]}")
    );
    assert_eq!(mismatch("{a: 1}", "{$nor: [{a: 2}, {a: 3}]}"), notation("{}"));
}

#[test]
fn test_or_reports_argument_verbatim() {
    assert_eq!(
        mismatch("{a: 1, b: 2}", "{$or: [{$and: [{a: 1}, {b: 3}]}]}"),
        notation("{$or: [{$and: [{a: 1}, {b: 3}]}]}")
    );
}

#[test]
fn test_and_nests_sub_mismatches() {
    assert_eq!(
        mismatch("{a: 1, b: {c: 2}}", "{$and: [{a: {$in: [1]}}, {'b.c': {$gt: 2, $lt: 9}}]}"),
        notation("{$and: [{'b.c': {$gt: 2}}]}")
    );
}

#[test]
fn test_logical_arguments_are_validated() {
    for op in ["$or", "$and", "$nor"] {
        for arg in ["[]", "{a: 1}", "[1]", "[{a: 1}, 'x']"] {
            let err = violation("{a: 1}", &format!("{{{op}: {arg}}}"));
            assert_eq!(err.operator, op);
            assert_eq!(err.received, notation(arg));
        }
    }
}

#[test]
fn test_where_with_expression_string() {
    assert_eq!(mismatch("{a: 3}", "{$where: 'this.a > 2'}"), notation("{}"));
    assert_eq!(
        mismatch("{a: 3}", "{$where: 'this.a > 5'}"),
        notation("{$where: 'this.a > 5'}")
    );
}

#[test]
fn test_where_with_predicate() {
    let doc = parse("{qty: 4}").unwrap();
    let predicate = Predicate::new(|doc| {
        matches!(doc.as_object().and_then(|o| o.get("qty")), Some(Value::Integer(n)) if n % 2 == 0)
    });
    let mut query = Map::new();
    query.insert("$where".into(), Value::Predicate(predicate.clone()));
    assert!(matches(&doc, &query).unwrap());

    let odd = parse("{qty: 5}").unwrap();
    let result = evaluate(&odd, &query).unwrap();
    assert_eq!(result.get("$where"), Some(&Value::Predicate(predicate)));
}

#[test]
fn test_where_argument_is_validated() {
    let err = violation("{a: 1}", "{$where: 5}");
    assert_eq!(err.operator, "$where");
    let err = violation("{a: 1}", "{$where: 'require(\"fs\")'}");
    assert_eq!(err.operator, "$where");
}

// ============================================================================
// Placement rules
// ============================================================================

#[test]
fn test_field_operator_at_top_level_is_rejected() {
    let err = violation("{a: 1}", "{$gt: 1}");
    assert_eq!(err.operator, "$gt");
}

#[test]
fn test_top_level_operator_under_field_is_rejected() {
    let err = violation("{a: 1}", "{a: {$or: [{b: 1}]}}");
    assert_eq!(err.operator, "$or");
}

#[test]
fn test_unknown_operators_are_rejected() {
    assert_eq!(violation("{a: 1}", "{$foo: 1}").operator, "$foo");
    assert_eq!(violation("{a: 1}", "{a: {$foo: 1}}").operator, "$foo");
    assert_eq!(violation("{a: [{}]}", "{a: {$elemMatch: {$foo: 1}}}").operator, "$foo");
}

#[test]
fn test_where_inside_elem_match_is_rejected() {
    let err = violation("{a: [{b: 1}]}", "{a: {$elemMatch: {$where: 'this.b == 1'}}}");
    assert_eq!(err.operator, "$where");
    assert!(err.expected.contains("$elemMatch"));
}

#[test]
fn test_errors_discard_partial_results() {
    assert!(eval("{a: 1, b: 2}", "{a: 2, b: {$mod: [1]}}").is_err());
}

// ============================================================================
// Purity
// ============================================================================

#[test]
fn test_repeated_evaluation_is_stable() {
    let doc = parse("{a: [1, 2], b: {c: 'x'}}").unwrap();
    let query = parse("{a: {$all: [1, 3]}, 'b.c': /y/, $or: [{a: 9}]}").unwrap();
    let doc_before = doc.clone();
    let query_before = query.clone();

    let first = evaluate(&doc, query.as_object().unwrap()).unwrap();
    let second = evaluate(&doc, query.as_object().unwrap()).unwrap();

    assert_eq!(Value::Object(first.clone()), Value::Object(second));
    assert_eq!(doc, doc_before);
    assert_eq!(query, query_before);
    assert_eq!(
        Value::Object(first),
        notation("{a: {$all: [1, 3]}, 'b.c': /y/, $or: [{a: 9}]}")
    );
}

#[test]
fn test_evaluation_across_threads() {
    let doc = parse("{a: 1}").unwrap();
    let query = parse("{a: {$in: [1, 2]}}").unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| assert!(matches(&doc, query.as_object().unwrap()).unwrap()));
        }
    });
}
