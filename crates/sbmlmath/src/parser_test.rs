use super::{parse_formula, parse_formula_with_options, ParseError};
use crate::kind::AstKind;
use crate::lexer::LexError;
use crate::node::AstNode;
use crate::options::ConversionOptions;

fn name(id: &str) -> AstNode {
    AstNode::name(id)
}

fn int(value: i64) -> AstNode {
    AstNode::integer(value)
}

fn node(kind: AstKind, children: Vec<AstNode>) -> AstNode {
    AstNode::with_children(kind, children).expect("valid node")
}

#[test]
fn parses_operator_precedence() {
    let ast = parse_formula("1 + 2 * x").expect("parse");
    assert_eq!(
        ast,
        node(
            AstKind::Plus,
            vec![int(1), node(AstKind::Times, vec![int(2), name("x")])]
        )
    );

    let grouped = parse_formula("(2 + 3) * 4").expect("parse");
    assert_eq!(
        grouped,
        node(
            AstKind::Times,
            vec![node(AstKind::Plus, vec![int(2), int(3)]), int(4)]
        )
    );
}

#[test]
fn sums_and_products_collect_until_parenthesised() {
    let flat = parse_formula("a + b + c").expect("parse");
    assert_eq!(flat, node(AstKind::Plus, vec![name("a"), name("b"), name("c")]));

    let nested = parse_formula("(a + b) + c").expect("parse");
    assert_eq!(
        nested,
        node(
            AstKind::Plus,
            vec![node(AstKind::Plus, vec![name("a"), name("b")]), name("c")]
        )
    );

    let mixed = parse_formula("a * b * c - d").expect("parse");
    assert_eq!(mixed.kind(), AstKind::Minus);
    assert_eq!(mixed.child(0).map(AstNode::num_children), Some(3));
}

#[test]
fn subtraction_and_division_associate_left() {
    let ast = parse_formula("a - b - c").expect("parse");
    assert_eq!(
        ast,
        node(
            AstKind::Minus,
            vec![node(AstKind::Minus, vec![name("a"), name("b")]), name("c")]
        )
    );

    let ast = parse_formula("a / b / c").expect("parse");
    assert_eq!(ast.kind(), AstKind::Divide);
    assert_eq!(ast.child(0).map(AstNode::kind), Some(AstKind::Divide));
}

#[test]
fn power_is_right_associative_and_binds_after_unary_minus() {
    let ast = parse_formula("2^3^4").expect("parse");
    assert_eq!(
        ast,
        node(
            AstKind::Power,
            vec![int(2), node(AstKind::Power, vec![int(3), int(4)])]
        )
    );

    let negative_base = parse_formula("-2^2").expect("parse");
    assert_eq!(negative_base, node(AstKind::Power, vec![int(-2), int(2)]));

    let negated_name = parse_formula("-x^2").expect("parse");
    assert_eq!(
        negated_name,
        node(
            AstKind::Power,
            vec![node(AstKind::Minus, vec![name("x")]), int(2)]
        )
    );
}

#[test]
fn minus_before_a_number_is_part_of_the_literal() {
    assert_eq!(parse_formula("-3").expect("parse"), int(-3));
    assert_eq!(parse_formula("- 2.5").expect("parse"), AstNode::real(-2.5));
    assert_eq!(
        parse_formula("-(3)").expect("parse"),
        node(AstKind::Minus, vec![int(3)])
    );
    assert_eq!(
        parse_formula("x - -3").expect("parse"),
        node(AstKind::Minus, vec![name("x"), int(-3)])
    );
    assert_eq!(
        parse_formula("-9223372036854775808").expect("parse"),
        int(i64::MIN)
    );
}

#[test]
fn number_encodings_are_kept_apart() {
    let real_e = parse_formula("6.02e23").expect("parse");
    assert_eq!(real_e.kind(), AstKind::RealE);
    assert_eq!(real_e.real_e_value(), Some((6.02, 23)));
    assert_ne!(real_e, AstNode::real(6.02e23));

    assert_eq!(parse_formula("2.50").expect("parse"), AstNode::real(2.5));
    assert_eq!(
        parse_formula("9223372036854775808").expect("parse"),
        AstNode::real(9_223_372_036_854_775_808.0)
    );
}

#[test]
fn tight_parenthesised_fraction_is_a_rational_literal() {
    assert_eq!(parse_formula("(4/8)").expect("parse"), AstNode::rational(4, 8));
    assert_eq!(parse_formula("(-4/8)").expect("parse"), AstNode::rational(-4, 8));
    assert_eq!(
        parse_formula("(4 / 8)").expect("parse"),
        node(AstKind::Divide, vec![int(4), int(8)])
    );
    assert_eq!(
        parse_formula("4/8").expect("parse"),
        node(AstKind::Divide, vec![int(4), int(8)])
    );
    assert_eq!(
        parse_formula("x * (1/3)").expect("parse"),
        node(AstKind::Times, vec![name("x"), AstNode::rational(1, 3)])
    );
}

#[test]
fn special_values_and_reserved_names() {
    assert_eq!(parse_formula("INF").expect("parse"), AstNode::real(f64::INFINITY));
    assert_eq!(
        parse_formula("-INF").expect("parse"),
        AstNode::real(f64::NEG_INFINITY)
    );
    assert_eq!(parse_formula("NaN").expect("parse"), AstNode::real(f64::NAN));
    assert_eq!(parse_formula("pi").expect("parse").kind(), AstKind::Pi);
    assert_eq!(parse_formula("true").expect("parse").kind(), AstKind::True);

    let time = parse_formula("time").expect("parse");
    assert_eq!(time.kind(), AstKind::Time);
    assert_eq!(time.name_str(), Some("time"));
}

#[test]
fn function_calls_use_the_keyword_table() {
    let sin = parse_formula("sin(x)").expect("parse");
    assert_eq!(sin, node(AstKind::Sin, vec![name("x")]));

    let sqrt = parse_formula("sqrt(x)").expect("parse");
    assert_eq!(sqrt, node(AstKind::Root, vec![name("x")]));

    let log10 = parse_formula("log10(x)").expect("parse");
    assert_eq!(log10, node(AstKind::Log, vec![name("x")]));

    let log = parse_formula("log(2, x)").expect("parse");
    assert_eq!(log, node(AstKind::Log, vec![int(2), name("x")]));

    let delay = parse_formula("delay(S, 2)").expect("parse");
    assert_eq!(delay.kind(), AstKind::Delay);
    assert_eq!(delay.name_str(), Some("delay"));

    let piecewise = parse_formula("piecewise(1, gt(x, 0), 0)").expect("parse");
    assert_eq!(piecewise.kind(), AstKind::Piecewise);
    assert_eq!(piecewise.child(1).map(AstNode::kind), Some(AstKind::Gt));
}

#[test]
fn unknown_names_become_user_function_calls() {
    let call = parse_formula("f(x, 1)").expect("parse");
    assert_eq!(call, AstNode::function("f", vec![name("x"), int(1)]));

    let empty = parse_formula("g()").expect("parse");
    assert_eq!(empty, AstNode::function("g", Vec::new()));
}

#[test]
fn builtin_arity_is_checked() {
    assert_eq!(
        parse_formula("sin(x, y)"),
        Err(ParseError::Arity {
            name: "sin".to_string(),
            count: 2,
            pos: 0,
        })
    );
    assert!(matches!(
        parse_formula("1 + sqrt(x, 2)"),
        Err(ParseError::Arity { count: 2, pos: 4, .. })
    ));
    assert!(matches!(
        parse_formula("delay(x)"),
        Err(ParseError::Arity { count: 1, .. })
    ));
}

#[test]
fn lambda_takes_names_then_a_body() {
    let lambda = parse_formula("lambda(x, y, x + y)").expect("parse");
    assert_eq!(lambda.kind(), AstKind::Lambda);
    assert_eq!(lambda.num_children(), 3);

    assert!(matches!(
        parse_formula("lambda(1, x)"),
        Err(ParseError::UnexpectedToken { pos: 0, .. })
    ));
}

#[test]
fn reports_syntax_errors_with_positions() {
    assert_eq!(parse_formula(""), Err(ParseError::EmptyExpression));
    assert_eq!(parse_formula("   "), Err(ParseError::EmptyExpression));
    assert_eq!(
        parse_formula("1 +"),
        Err(ParseError::UnexpectedToken {
            expected: "number, name or `(`".to_string(),
            found: "end of input".to_string(),
            pos: 3,
        })
    );
    assert!(matches!(
        parse_formula("(1"),
        Err(ParseError::UnexpectedToken { pos: 2, .. })
    ));
    assert!(matches!(
        parse_formula("1 2"),
        Err(ParseError::UnexpectedToken { pos: 2, .. })
    ));
    assert_eq!(
        parse_formula("a % b"),
        Err(ParseError::Lex(LexError::UnexpectedCharacter { ch: '%', pos: 2 }))
    );
    assert_eq!(parse_formula("1 +").err().and_then(|err| err.pos()), Some(3));
}

#[test]
fn nesting_beyond_the_limit_fails_cleanly() {
    let options = ConversionOptions::default().with_max_depth(3);
    assert_eq!(
        parse_formula_with_options("((((x))))", &options),
        Err(ParseError::DepthExceeded { limit: 3, pos: 3 })
    );
    assert!(parse_formula_with_options("((x))", &options).is_ok());

    let deep = format!("{}x", "-".repeat(10_000));
    assert!(matches!(
        parse_formula(&deep),
        Err(ParseError::DepthExceeded { limit: 64, .. })
    ));
}

#[test]
fn default_limit_stops_deep_grouping_before_the_stack_runs_out() {
    let limit = ConversionOptions::DEFAULT_MAX_DEPTH;
    let within = format!("{}x{}", "(".repeat(limit - 1), ")".repeat(limit - 1));
    assert!(parse_formula(&within).is_ok());

    let opened = "(".repeat(5000);
    assert!(matches!(
        parse_formula(&opened),
        Err(ParseError::DepthExceeded { limit: 64, .. })
    ));
    let calls = format!("{}x{}", "f(".repeat(5000), ")".repeat(5000));
    assert!(matches!(
        parse_formula(&calls),
        Err(ParseError::DepthExceeded { .. })
    ));
    let powers = format!("x{}", "^x".repeat(5000));
    assert!(matches!(
        parse_formula(&powers),
        Err(ParseError::DepthExceeded { .. })
    ));
}
