pub mod issues;
pub mod node_path;

pub use issues::{Diagnostic, DiagnosticSeverity, DiagnosticSink};
pub use node_path::{NodePath, NodePathParseError, NodePathSegment};
