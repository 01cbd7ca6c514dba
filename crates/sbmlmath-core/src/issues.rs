use crate::node_path::NodePath;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// A recoverable condition noticed while converting a formula.
///
/// `offset` is the approximate byte offset into the source text when the
/// condition came from parsed input, `path` locates the offending element
/// inside a MathML document (root when unknown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "NodePath::is_root")]
    pub path: NodePath,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            offset: None,
            path: NodePath::root(),
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, DiagnosticSeverity::Warning, message)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, DiagnosticSeverity::Error, message)
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_path(mut self, path: NodePath) -> Self {
        self.path = path;
        self
    }

    pub fn sort_stable(diagnostics: &mut [Self]) {
        diagnostics.sort_by(|left, right| {
            (left.severity, &left.code, &left.path, left.offset, &left.message).cmp(&(
                right.severity,
                &right.code,
                &right.path,
                right.offset,
                &right.message,
            ))
        });
    }
}

/// Receiver for recoverable diagnostics raised during a conversion.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}

#[cfg(test)]
#[path = "issues_test.rs"]
mod tests;
