use super::{AstNode, NodeError, Payload};
use crate::kind::{Arity, AstKind};

fn x() -> AstNode {
    AstNode::name("x")
}

#[test]
fn constructors_set_kind_and_payload() {
    assert_eq!(AstNode::integer(5).integer_value(), Some(5));
    assert_eq!(AstNode::real(2.5).real_value(), Some(2.5));
    assert_eq!(AstNode::real_e(6.02, 23).real_e_value(), Some((6.02, 23)));
    assert_eq!(AstNode::rational(4, 8).rational_value(), Some((4, 8)));
    assert_eq!(AstNode::name("k1").name_str(), Some("k1"));
    assert_eq!(AstNode::new(AstKind::Time).name_str(), Some(""));
    assert_eq!(AstNode::new(AstKind::Plus).payload(), &Payload::None);
    assert_eq!(AstNode::unknown("<foo/>").raw_xml(), Some("<foo/>"));
}

#[test]
fn rational_is_not_reduced() {
    let node = AstNode::rational(4, 8);
    assert_ne!(node, AstNode::rational(1, 2));
}

#[test]
fn with_children_validates_arity() {
    let plus = AstNode::with_children(AstKind::Plus, vec![AstNode::integer(1), x()])
        .expect("plus");
    assert_eq!(plus.num_children(), 2);

    let err = AstNode::with_children(AstKind::Divide, vec![x()]).expect_err("divide needs two");
    assert_eq!(
        err,
        NodeError::Arity {
            kind: AstKind::Divide,
            arity: Arity::BINARY,
            count: 1,
        }
    );
}

#[test]
fn adding_beyond_the_maximum_leaves_the_node_unchanged() {
    let mut divide = AstNode::new(AstKind::Divide);
    divide.add_child(AstNode::integer(1)).expect("first");
    divide.add_child(AstNode::integer(2)).expect("second");
    let before = divide.clone();

    let err = divide.add_child(AstNode::integer(3)).expect_err("third");
    assert!(matches!(err, NodeError::Arity { count: 3, .. }));
    assert_eq!(divide, before);
}

#[test]
fn removing_below_the_minimum_is_rejected() {
    let mut sin = AstNode::with_children(AstKind::Sin, vec![x()]).expect("sin");
    assert!(sin.remove_child(0).is_err());
    assert_eq!(sin.num_children(), 1);

    let mut plus = AstNode::with_children(AstKind::Plus, vec![x(), AstNode::integer(1)])
        .expect("plus");
    assert_eq!(plus.remove_child(0).expect("remove"), x());
    assert_eq!(plus.children(), &[AstNode::integer(1)]);
    assert!(matches!(
        plus.remove_child(4),
        Err(NodeError::IndexOutOfRange { index: 4, count: 1 })
    ));
}

#[test]
fn insert_replace_and_swap() {
    let mut minus = AstNode::new(AstKind::Minus);
    minus.add_child(AstNode::integer(2)).expect("add");
    minus.insert_child(0, x()).expect("insert");
    assert_eq!(minus.children(), &[x(), AstNode::integer(2)]);

    minus.swap_children(0, 1).expect("swap");
    assert_eq!(minus.children(), &[AstNode::integer(2), x()]);

    let old = minus.replace_child(1, AstNode::name("y")).expect("replace");
    assert_eq!(old, x());
    assert_eq!(minus.child(1), Some(&AstNode::name("y")));
    assert!(minus.insert_child(5, x()).is_err());
}

#[test]
fn lambda_bound_variables_must_be_names() {
    let err = AstNode::with_children(
        AstKind::Lambda,
        vec![AstNode::integer(1), AstNode::integer(2)],
    )
    .expect_err("bound variable");
    assert_eq!(err, NodeError::BoundVariable { index: 0 });

    let mut lambda = AstNode::new(AstKind::Lambda);
    lambda.add_child(x()).expect("bvar");
    lambda.add_child(AstNode::integer(2)).expect("body");
    // the old body would become a bound variable
    assert!(lambda.add_child(AstNode::integer(3)).is_err());
    lambda.insert_child(1, AstNode::name("y")).expect("second bvar");
    assert_eq!(lambda.num_children(), 3);
    lambda.validate().expect("valid lambda");
}

#[test]
fn lambda_edits_cannot_turn_a_bound_variable_into_an_expression() {
    let mut lambda = AstNode::with_children(
        AstKind::Lambda,
        vec![x(), AstNode::name("y"), AstNode::integer(2)],
    )
    .expect("lambda");
    assert_eq!(
        lambda.replace_child(0, AstNode::integer(3)),
        Err(NodeError::BoundVariable { index: 0 })
    );
    assert_eq!(
        lambda.swap_children(1, 2),
        Err(NodeError::BoundVariable { index: 1 })
    );
    assert_eq!(lambda.rename_references("x", "z"), 1);
    assert_eq!(lambda.child(0), Some(&AstNode::name("z")));
    lambda.validate().expect("still a valid lambda");
}

#[test]
fn set_kind_keeps_compatible_payload() {
    let mut node = AstNode::name("t");
    node.set_kind(AstKind::Time).expect("name to time");
    assert_eq!(node.name_str(), Some("t"));

    node.set_kind(AstKind::Plus).expect("time to plus");
    assert_eq!(node.payload(), &Payload::None);

    let mut divide =
        AstNode::with_children(AstKind::Divide, vec![x(), x()]).expect("divide");
    assert!(divide.set_kind(AstKind::Sin).is_err());
    assert_eq!(divide.kind(), AstKind::Divide);
}

#[test]
fn set_kind_requires_the_full_arity() {
    let mut plus = AstNode::new(AstKind::Plus);
    assert_eq!(
        plus.set_kind(AstKind::Divide),
        Err(NodeError::Arity {
            kind: AstKind::Divide,
            arity: Arity::BINARY,
            count: 0,
        })
    );
    assert_eq!(plus.kind(), AstKind::Plus);

    plus.add_child(x()).expect("first");
    plus.add_child(x()).expect("second");
    plus.set_kind(AstKind::Divide).expect("two children fit divide");
    plus.validate().expect("valid divide");
}

#[test]
fn numeric_setters_replace_kind_and_value() {
    let mut node = AstNode::name("x");
    node.set_real_e(1.5, -3).expect("real e");
    assert_eq!(node.kind(), AstKind::RealE);
    assert_eq!(node.real_e_value(), Some((1.5, -3)));

    let mut plus = AstNode::with_children(AstKind::Plus, vec![x()]).expect("plus");
    assert!(plus.set_integer(1).is_err());
}

#[test]
fn set_name_requires_a_name_bearing_kind() {
    let mut function = AstNode::function("f", vec![x()]);
    function.set_name("g").expect("rename");
    assert_eq!(function.name_str(), Some("g"));

    let mut plus = AstNode::new(AstKind::Plus);
    assert_eq!(
        plus.set_name("p"),
        Err(NodeError::NoName {
            kind: AstKind::Plus
        })
    );
}

#[test]
fn nan_literals_compare_equal() {
    assert_eq!(AstNode::real(f64::NAN), AstNode::real(f64::NAN));
    assert_ne!(AstNode::real(0.0), AstNode::real(-0.0));
    assert_ne!(AstNode::real(1.0), AstNode::integer(1));
}

#[test]
fn structural_equality_is_order_sensitive() {
    let left = AstNode::with_children(AstKind::Plus, vec![x(), AstNode::integer(1)])
        .expect("left");
    let right = AstNode::with_children(AstKind::Plus, vec![AstNode::integer(1), x()])
        .expect("right");
    assert!(!left.structurally_equal(&right));
    assert!(left.structurally_equal(&left.clone()));
}

#[test]
fn deep_trees_are_walked_without_recursion() {
    let mut node = x();
    for _ in 0..100_000 {
        node = AstNode::with_children(AstKind::Minus, vec![node]).expect("minus");
    }
    assert_eq!(node.depth(), 100_001);
    assert_eq!(node.node_count(), 100_001);
    assert!(node.structurally_equal(&node));
    node.validate().expect("valid");
    drop(node);
}

#[test]
fn names_are_collected_and_renamed() {
    let mut node = AstNode::with_children(
        AstKind::Times,
        vec![
            AstNode::name("k1"),
            AstNode::function("k1", vec![AstNode::name("S")]),
            AstNode::name("S"),
        ],
    )
    .expect("times");
    assert_eq!(node.referenced_names(), vec!["k1", "S"]);
    assert_eq!(node.rename_references("k1", "k2"), 2);
    assert_eq!(node.child(1).and_then(AstNode::name_str), Some("k2"));
    assert!(node.contains_kind(AstKind::Function));
    assert!(!node.contains_kind(AstKind::Divide));
}
