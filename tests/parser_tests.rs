//! Grammar coverage for the expression parser.

mod common;

use promql_builder::{BinaryOp, Expr, GroupingAction, MatchOp, parse};

#[test]
fn test_selector_forms() {
    for query in [
        "up",
        "job:request_rate:5m",
        r#"up{job="api"}"#,
        r#"{job="prometheus"}"#,
        "up[5m]",
        "up offset 30m",
        r#"up{job="api"}[5m] offset 1h"#,
    ] {
        let tree = assert_parses!(query);
        assert!(matches!(tree, Expr::Selector(_)), "for {query:?}");
    }
}

#[test]
fn test_matcher_operators() {
    let tree = assert_parses!(r#"m{a="1",b!="2",c=~"3",d!~"4"}"#);
    let Expr::Selector(sel) = tree else {
        panic!("expected selector");
    };
    let ops: Vec<_> = sel.matchers.iter().map(|m| m.op).collect();
    assert_eq!(
        ops,
        vec![
            MatchOp::Equal,
            MatchOp::NotEqual,
            MatchOp::RegexMatch,
            MatchOp::RegexNotMatch
        ]
    );
}

#[test]
fn test_keywords_remain_valid_metric_names() {
    for name in ["rate", "sum", "by", "without", "offset", "and", "or", "unless"] {
        let tree = assert_parses!(name);
        match tree {
            Expr::Selector(sel) => assert_eq!(sel.name.as_deref(), Some(name)),
            other => panic!("expected selector for {name:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_durations_only_in_range_positions() {
    // Outside `[...]`/`offset`, digits-then-letter is a number followed by
    // junk, not a duration
    assert_parse_error!("5m");
    assert_parses!("m[5m]");
    assert_parses!("m offset 5m");
}

#[test]
fn test_grouping_placement_equivalence() {
    let before = assert_parses!("sum by (job) (rate(m[5m]))");
    let after = assert_parses!("sum(rate(m[5m])) by (job)");
    assert_eq!(before, after);

    let Expr::Call(call) = before else {
        panic!("expected call");
    };
    let grouping = call.grouping.expect("grouping should be present");
    assert_eq!(grouping.action, GroupingAction::By);
    assert_eq!(grouping.labels, vec!["job"]);
}

#[test]
fn test_grouping_on_any_function_name() {
    // Grouping acceptance is positional, not tied to an aggregation list
    let tree = assert_parses!("rate(m[5m]) by (job)");
    assert!(matches!(tree, Expr::Call(c) if c.grouping.is_some()));
}

#[test]
fn test_call_argument_shapes() {
    assert_parses!("time()");
    assert_parses!("clamp_max(m, 100)");
    assert_parses!(r#"label_replace(up, "dst", "$1", "src", "(.*)")"#);
    assert_parses!("round(m, 0.5)");
    // Trailing comma tolerated
    assert_parses!("clamp_max(m, 100,)");
}

#[test]
fn test_precedence_table() {
    fn root_op(query: &str) -> BinaryOp {
        match parse(query).unwrap() {
            Expr::Binary(b) => b.op,
            other => panic!("expected binary for {query:?}, got {other:?}"),
        }
    }

    // The loosest operator ends up at the root
    assert_eq!(root_op("a + b > c"), BinaryOp::Gt);
    assert_eq!(root_op("a > c and d"), BinaryOp::And);
    assert_eq!(root_op("a and b or c"), BinaryOp::Or);
    assert_eq!(root_op("a * b + c"), BinaryOp::Add);
    assert_eq!(root_op("a ^ b * c"), BinaryOp::Mul);
    assert_eq!(root_op("a % b - c"), BinaryOp::Sub);
}

#[test]
fn test_associativity() {
    // Left for everything but `^`
    match parse("a - b - c").unwrap() {
        Expr::Binary(b) => {
            assert_eq!(b.op, BinaryOp::Sub);
            assert!(matches!(b.lhs, Expr::Binary(_)));
            assert!(matches!(b.rhs, Expr::Selector(_)));
        }
        other => panic!("unexpected tree: {other:?}"),
    }
    match parse("a ^ b ^ c").unwrap() {
        Expr::Binary(b) => {
            assert_eq!(b.op, BinaryOp::Pow);
            assert!(matches!(b.lhs, Expr::Selector(_)));
            assert!(matches!(b.rhs, Expr::Binary(_)));
        }
        other => panic!("unexpected tree: {other:?}"),
    }
}

#[test]
fn test_keyword_operator_word_boundaries() {
    // `orange` is one identifier, so this is two expressions in a row
    assert_parse_error!("a orange");
    assert_parses!("a or ange");
    // Case-insensitive keywords
    assert_parses!("a OR b");
    assert_parses!("a UNLESS b");
}

#[test]
fn test_parens_collapse_in_tree() {
    assert_eq!(parse("((up))").unwrap(), parse("up").unwrap());
    assert_eq!(parse("(a + b) * c").unwrap().to_string(), "((a + b) * c)");
}

#[test]
fn test_whitespace_and_comments() {
    assert_parses!("  sum(\n    rate(m[5m]) # per-second rate\n  ) by (job)\n");
    assert_parses!("\t1\t+\t2\t");
}

#[test]
fn test_unsupported_grammar_rejected() {
    // Subqueries
    assert_parse_error!("rate(m[5m])[30m:1m]");
    assert_parse_error!("m[5m:1m]");
    // Vector matching modifiers
    assert_parse_error!("a / on(job) b");
    assert_parse_error!("a + ignoring(pod) b");
}
