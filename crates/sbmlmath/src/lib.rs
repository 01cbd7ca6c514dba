pub mod canonical;
pub mod extension;
pub mod formatter;
pub mod kind;
pub mod lexer;
pub mod mathml;
pub mod node;
pub mod options;
pub mod parser;

pub use canonical::{canonicalize, canonicalize_with_extensions};
pub use extension::{
    split_definition_url, ExtensionDef, ExtensionForm, ExtensionKind, ExtensionLookup,
    ExtensionRegistry, MathPackage, RegistryError,
};
pub use formatter::{format_formula, format_formula_with_options, FormatError};
pub use kind::{Arity, AstKind, KindGroup, MathmlForm, PayloadClass};
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use mathml::{
    read_mathml, read_mathml_with, write_mathml, write_mathml_with, MathmlReadError,
    MathmlWriteError, MATHML_NS, SBML_SYMBOLS_NS,
};
pub use node::{AstNode, NodeError, Payload};
pub use options::ConversionOptions;
pub use parser::{parse_formula, parse_formula_with_options, ParseError, Parser};
pub use sbmlmath_core::{Diagnostic, DiagnosticSeverity, DiagnosticSink, NodePath};

#[cfg(test)]
#[path = "roundtrip_test.rs"]
mod roundtrip_tests;
