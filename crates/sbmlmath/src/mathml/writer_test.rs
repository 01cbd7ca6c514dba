use sbmlmath_core::Diagnostic;

use super::{write_mathml, write_mathml_with, MathmlWriteError};
use crate::extension::{ExtensionDef, ExtensionKind, ExtensionRegistry, MathPackage};
use crate::kind::{Arity, AstKind};
use crate::mathml::{read_mathml, read_mathml_with};
use crate::node::AstNode;
use crate::options::ConversionOptions;

const PULSE: ExtensionKind = ExtensionKind {
    package: "signals",
    name: "pulse",
    arity: Arity::BINARY,
};

const NOISE: ExtensionKind = ExtensionKind {
    package: "signals",
    name: "noise",
    arity: Arity::Any,
};

struct Signals;

impl MathPackage for Signals {
    fn name(&self) -> &'static str {
        "signals"
    }

    fn definitions(&self) -> Vec<ExtensionDef> {
        vec![
            ExtensionDef::csymbol(PULSE, "http://example.org/signals/"),
            ExtensionDef::element(NOISE, "http://example.org/signals/"),
        ]
    }
}

fn node(kind: AstKind, children: Vec<AstNode>) -> AstNode {
    AstNode::with_children(kind, children).expect("valid node")
}

fn compact(tree: &AstNode) -> String {
    let options = ConversionOptions::default().with_indent(0);
    write_mathml_with(tree, &ExtensionRegistry::new(), &options).expect("write")
}

fn body(tree: &AstNode) -> String {
    let written = compact(tree);
    written
        .trim_start_matches(r#"<math xmlns="http://www.w3.org/1998/Math/MathML">"#)
        .trim_end_matches("</math>")
        .to_string()
}

#[test]
fn writes_indented_documents() {
    let tree = node(
        AstKind::Divide,
        vec![AstNode::name("vm"), AstNode::integer(2)],
    );
    let expected = [
        r#"<math xmlns="http://www.w3.org/1998/Math/MathML">"#,
        "  <apply>",
        "    <divide/>",
        "    <ci> vm </ci>",
        r#"    <cn type="integer"> 2 </cn>"#,
        "  </apply>",
        "</math>",
    ]
    .join("\n");
    assert_eq!(write_mathml(&tree).expect("write"), expected);
}

#[test]
fn compact_output_and_declaration() {
    let tree = AstNode::name("x");
    assert_eq!(
        compact(&tree),
        r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><ci> x </ci></math>"#
    );

    let options = ConversionOptions::default().with_xml_declaration(true);
    let written = write_mathml_with(&tree, &ExtensionRegistry::new(), &options).expect("write");
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<math"));
}

#[test]
fn numbers_are_typed() {
    assert_eq!(body(&AstNode::integer(5)), r#"<cn type="integer"> 5 </cn>"#);
    assert_eq!(body(&AstNode::real(2.0)), "<cn> 2.0 </cn>");
    assert_eq!(
        body(&AstNode::real_e(6.02, 23)),
        r#"<cn type="e-notation"> 6.02 <sep/> 23 </cn>"#
    );
    assert_eq!(
        body(&AstNode::rational(4, 8)),
        r#"<cn type="rational"> 4 <sep/> 8 </cn>"#
    );
    assert_eq!(body(&AstNode::real(f64::INFINITY)), "<infinity/>");
    assert_eq!(body(&AstNode::real(f64::NEG_INFINITY)), "<cn> -INF </cn>");
    assert_eq!(body(&AstNode::real(f64::NAN)), "<notanumber/>");
}

#[test]
fn sbml_symbols_are_csymbols() {
    assert_eq!(
        body(&AstNode::symbol(AstKind::Time, "t")),
        r#"<csymbol encoding="text" definitionURL="http://www.sbml.org/sbml/symbols/time"> t </csymbol>"#
    );
    let mut delay = AstNode::symbol(AstKind::Delay, "delay");
    delay.add_child(AstNode::name("S")).expect("add");
    delay.add_child(AstNode::real(0.5)).expect("add");
    assert_eq!(
        body(&delay),
        concat!(
            "<apply>",
            r#"<csymbol encoding="text" definitionURL="http://www.sbml.org/sbml/symbols/delay"> delay </csymbol>"#,
            "<ci> S </ci><cn> 0.5 </cn>",
            "</apply>"
        )
    );
}

#[test]
fn pow_is_written_as_power_and_reads_back_as_power() {
    let pow = node(AstKind::Pow, vec![AstNode::name("x"), AstNode::integer(2)]);
    let written = compact(&pow);
    assert_eq!(
        written,
        concat!(
            r#"<math xmlns="http://www.w3.org/1998/Math/MathML">"#,
            r#"<apply><power/><ci> x </ci><cn type="integer"> 2 </cn></apply></math>"#
        )
    );
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let read = read_mathml(&written, &mut diagnostics).expect("read");
    assert_eq!(read.kind(), AstKind::Power);
    assert_ne!(read, pow);
    assert_eq!(
        read,
        node(AstKind::Power, vec![AstNode::name("x"), AstNode::integer(2)])
    );
}

#[test]
fn qualifiers_and_containers() {
    let root = node(AstKind::Root, vec![AstNode::integer(3), AstNode::name("x")]);
    assert_eq!(
        body(&root),
        r#"<apply><root/><degree><cn type="integer"> 3 </cn></degree><ci> x </ci></apply>"#
    );

    let piecewise = node(
        AstKind::Piecewise,
        vec![AstNode::integer(1), AstNode::new(AstKind::True), AstNode::integer(0)],
    );
    assert_eq!(
        body(&piecewise),
        concat!(
            "<piecewise><piece>",
            r#"<cn type="integer"> 1 </cn><true/>"#,
            "</piece><otherwise>",
            r#"<cn type="integer"> 0 </cn>"#,
            "</otherwise></piecewise>"
        )
    );

    let lambda = node(AstKind::Lambda, vec![AstNode::name("x"), AstNode::name("x")]);
    assert_eq!(
        body(&lambda),
        "<lambda><bvar><ci> x </ci></bvar><ci> x </ci></lambda>"
    );

    assert_eq!(body(&node(AstKind::EmptySet, Vec::new())), "<emptyset/>");
    assert_eq!(body(&node(AstKind::Vector, Vec::new())), "<vector/>");
}

#[test]
fn text_is_escaped() {
    assert_eq!(body(&AstNode::name("a<b")), "<ci> a&lt;b </ci>");
}

#[test]
fn unknown_nodes_are_written_verbatim() {
    let raw = r#"<apply><csymbol definitionURL="urn:x-unknown"/></apply>"#;
    assert_eq!(body(&AstNode::unknown(raw)), raw);
    assert_eq!(
        write_mathml(&AstNode::unknown("")),
        Err(MathmlWriteError::Unsupported(AstKind::Unknown))
    );
}

#[test]
fn extensions_follow_their_definition() {
    let pulse = node(
        AstKind::Extension(PULSE),
        vec![AstNode::name("t"), AstNode::integer(1)],
    );
    assert_eq!(
        write_mathml(&pulse),
        Err(MathmlWriteError::UnregisteredExtension(AstKind::Extension(PULSE)))
    );

    let mut registry = ExtensionRegistry::new();
    registry.register_package(&Signals).expect("register");
    let options = ConversionOptions::default().with_indent(0);
    let written = write_mathml_with(&pulse, &registry, &options).expect("write");
    assert!(written.contains(
        r#"<apply><csymbol encoding="text" definitionURL="http://example.org/signals/pulse"> pulse </csymbol>"#
    ));

    let noise = node(AstKind::Extension(NOISE), Vec::new());
    let written = write_mathml_with(&noise, &registry, &options).expect("write");
    assert!(written.contains(r#"<noise xmlns="http://example.org/signals/"/>"#));
}

#[test]
fn incomplete_nodes_are_rejected() {
    let mut minus = AstNode::new(AstKind::Minus);
    assert_eq!(
        write_mathml(&minus),
        Err(MathmlWriteError::Arity {
            kind: AstKind::Minus,
            count: 0,
        })
    );
    minus.add_child(AstNode::name("x")).expect("add");
    assert!(write_mathml(&minus).is_ok());
}

#[test]
fn written_documents_read_back_to_the_same_tree() {
    let mut registry = ExtensionRegistry::new();
    registry.register_package(&Signals).expect("register");
    let options = ConversionOptions::default();

    let trees = vec![
        node(AstKind::Plus, vec![AstNode::integer(1), AstNode::integer(2)]),
        node(
            AstKind::Log,
            vec![AstNode::integer(2), AstNode::real_e(-1.5, -3)],
        ),
        node(
            AstKind::Times,
            vec![
                AstNode::rational(4, 8),
                AstNode::real(f64::NEG_INFINITY),
                AstNode::function("f", vec![AstNode::symbol(AstKind::Avogadro, "NA")]),
            ],
        ),
        node(
            AstKind::Union,
            vec![
                node(AstKind::Set, vec![AstNode::name("a")]),
                node(AstKind::Interval, vec![AstNode::integer(0), AstNode::integer(1)]),
            ],
        ),
        node(
            AstKind::Extension(PULSE),
            vec![AstNode::name("t"), AstNode::new(AstKind::Pi)],
        ),
        node(
            AstKind::Extension(NOISE),
            vec![AstNode::real(0.25)],
        ),
    ];
    for tree in trees {
        let written = write_mathml_with(&tree, &registry, &options).expect("write");
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let read = read_mathml_with(&written, &registry, &options, &mut diagnostics).expect("read");
        assert_eq!(read, tree, "{written}");
        assert!(diagnostics.is_empty());
    }
}

#[test]
fn unknown_markup_keeps_namespaces_declared_on_ancestors() {
    let input = concat!(
        r#"<math xmlns="http://www.w3.org/1998/Math/MathML" xmlns:x="urn:x">"#,
        "<apply><plus/><x:foo/><cn>1</cn></apply></math>"
    );
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let tree = read_mathml(input, &mut diagnostics).expect("read");
    assert_eq!(diagnostics.len(), 1);
    let raw = tree.child(0).and_then(AstNode::raw_xml).expect("unknown child");
    assert!(raw.starts_with("<x:foo "), "{raw}");
    assert!(raw.contains(r#"xmlns:x="urn:x""#), "{raw}");

    let written = write_mathml(&tree).expect("write");
    let mut reread: Vec<Diagnostic> = Vec::new();
    let again = read_mathml(&written, &mut reread).expect("written markup parses");
    assert_eq!(again, tree, "{written}");
    assert_eq!(reread.len(), 1);
}
