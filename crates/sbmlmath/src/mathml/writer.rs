use super::{MATHML_NS, SBML_SYMBOLS_NS};
use crate::extension::{ExtensionForm, ExtensionLookup, ExtensionRegistry};
use crate::formatter::format_real;
use crate::kind::{AstKind, MathmlForm};
use crate::node::AstNode;
use crate::options::ConversionOptions;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MathmlWriteError {
    #[error("{0} cannot be written as MathML")]
    Unsupported(AstKind),
    #[error("no registered package defines {0}")]
    UnregisteredExtension(AstKind),
    #[error("{kind} with {count} children cannot be written")]
    Arity { kind: AstKind, count: usize },
    #[error("tree nested deeper than {limit}")]
    DepthExceeded { limit: usize },
}

pub fn write_mathml(node: &AstNode) -> Result<String, MathmlWriteError> {
    write_mathml_with(node, &ExtensionRegistry::new(), &ConversionOptions::default())
}

/// Writes `node` as a `<math>` document. Extension kinds are spelled the
/// way their registered definition says.
pub fn write_mathml_with(
    node: &AstNode,
    extensions: &dyn ExtensionLookup,
    options: &ConversionOptions,
) -> Result<String, MathmlWriteError> {
    let mut writer = MathmlWriter {
        lines: Vec::new(),
        extensions,
        indent: options.indent,
        max_depth: options.max_depth,
    };
    if options.xml_declaration {
        writer.line(0, r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string());
    }
    writer.line(0, format!(r#"<math xmlns="{MATHML_NS}">"#));
    writer.write_node(node, 1)?;
    writer.line(0, "</math>".to_string());

    let separator = if options.indent == 0 { "" } else { "\n" };
    let out = writer.lines.join(separator);
    tracing::debug!(len = out.len(), "wrote MathML");
    Ok(out)
}

struct MathmlWriter<'w> {
    lines: Vec<String>,
    extensions: &'w dyn ExtensionLookup,
    indent: usize,
    max_depth: usize,
}

impl MathmlWriter<'_> {
    fn line(&mut self, level: usize, text: String) {
        let padding = " ".repeat(level * self.indent);
        self.lines.push(format!("{padding}{text}"));
    }

    fn write_node(&mut self, node: &AstNode, level: usize) -> Result<(), MathmlWriteError> {
        if level > self.max_depth {
            return Err(MathmlWriteError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        let kind = node.kind();
        let count = node.num_children();
        if !kind.arity().allows(count) {
            return Err(MathmlWriteError::Arity { kind, count });
        }

        match kind.mathml_form() {
            MathmlForm::Number => self.write_number(node, level),
            MathmlForm::Identifier => {
                let name = node.name_str().unwrap_or_default();
                self.line(level, format!("<ci> {} </ci>", escape(name)));
                Ok(())
            }
            MathmlForm::UserFunction => {
                let name = node.name_str().unwrap_or_default();
                self.line(level, "<apply>".to_string());
                self.line(level + 1, format!("<ci> {} </ci>", escape(name)));
                self.write_children(node.children(), level + 1)?;
                self.line(level, "</apply>".to_string());
                Ok(())
            }
            MathmlForm::SbmlSymbol(symbol) => {
                let label = node.name_str().filter(|name| !name.is_empty()).unwrap_or(symbol);
                let csymbol = format!(
                    r#"<csymbol encoding="text" definitionURL="{SBML_SYMBOLS_NS}{symbol}"> {} </csymbol>"#,
                    escape(label)
                );
                self.write_applied(csymbol, node.children(), level)
            }
            MathmlForm::Constant(element) => {
                self.line(level, format!("<{element}/>"));
                Ok(())
            }
            MathmlForm::Operator(element) => {
                self.line(level, "<apply>".to_string());
                self.line(level + 1, format!("<{element}/>"));
                let qualifier = match (kind, count) {
                    (AstKind::Root, 2) => Some("degree"),
                    (AstKind::Log, 2) => Some("logbase"),
                    _ => None,
                };
                let mut operands = node.children();
                if let (Some(qualifier), Some((first, rest))) = (qualifier, operands.split_first()) {
                    self.line(level + 1, format!("<{qualifier}>"));
                    self.write_node(first, level + 2)?;
                    self.line(level + 1, format!("</{qualifier}>"));
                    operands = rest;
                }
                self.write_children(operands, level + 1)?;
                self.line(level, "</apply>".to_string());
                Ok(())
            }
            MathmlForm::Container("piecewise") => self.write_piecewise(node, level),
            MathmlForm::Container("lambda") => self.write_lambda(node, level),
            MathmlForm::Container(element) => {
                if count == 0 {
                    self.line(level, format!("<{element}/>"));
                    return Ok(());
                }
                self.line(level, format!("<{element}>"));
                self.write_children(node.children(), level + 1)?;
                self.line(level, format!("</{element}>"));
                Ok(())
            }
            MathmlForm::Extension => self.write_extension(node, level),
            MathmlForm::Unknown => {
                let raw = node.raw_xml().unwrap_or_default();
                if raw.trim().is_empty() {
                    return Err(MathmlWriteError::Unsupported(kind));
                }
                self.line(level, raw.to_string());
                Ok(())
            }
        }
    }

    fn write_children(&mut self, children: &[AstNode], level: usize) -> Result<(), MathmlWriteError> {
        for child in children {
            self.write_node(child, level)?;
        }
        Ok(())
    }

    /// `head` alone when there are no arguments, else an `<apply>` around it.
    fn write_applied(&mut self, head: String, arguments: &[AstNode], level: usize) -> Result<(), MathmlWriteError> {
        if arguments.is_empty() {
            self.line(level, head);
            return Ok(());
        }
        self.line(level, "<apply>".to_string());
        self.line(level + 1, head);
        self.write_children(arguments, level + 1)?;
        self.line(level, "</apply>".to_string());
        Ok(())
    }

    fn write_number(&mut self, node: &AstNode, level: usize) -> Result<(), MathmlWriteError> {
        let text = if let Some(value) = node.integer_value() {
            format!(r#"<cn type="integer"> {value} </cn>"#)
        } else if let Some(value) = node.real_value() {
            if value.is_nan() {
                "<notanumber/>".to_string()
            } else if value == f64::INFINITY {
                "<infinity/>".to_string()
            } else {
                format!("<cn> {} </cn>", format_real(value))
            }
        } else if let Some((mantissa, exponent)) = node.real_e_value() {
            format!(
                r#"<cn type="e-notation"> {} <sep/> {exponent} </cn>"#,
                format_real(mantissa)
            )
        } else if let Some((numerator, denominator)) = node.rational_value() {
            format!(r#"<cn type="rational"> {numerator} <sep/> {denominator} </cn>"#)
        } else {
            return Err(MathmlWriteError::Unsupported(node.kind()));
        };
        self.line(level, text);
        Ok(())
    }

    fn write_piecewise(&mut self, node: &AstNode, level: usize) -> Result<(), MathmlWriteError> {
        self.line(level, "<piecewise>".to_string());
        let mut pairs = node.children().chunks_exact(2);
        for pair in pairs.by_ref() {
            self.line(level + 1, "<piece>".to_string());
            self.write_children(pair, level + 2)?;
            self.line(level + 1, "</piece>".to_string());
        }
        if let [otherwise] = pairs.remainder() {
            self.line(level + 1, "<otherwise>".to_string());
            self.write_node(otherwise, level + 2)?;
            self.line(level + 1, "</otherwise>".to_string());
        }
        self.line(level, "</piecewise>".to_string());
        Ok(())
    }

    fn write_lambda(&mut self, node: &AstNode, level: usize) -> Result<(), MathmlWriteError> {
        let Some((body, bound)) = node.children().split_last() else {
            return Err(MathmlWriteError::Arity {
                kind: node.kind(),
                count: 0,
            });
        };
        self.line(level, "<lambda>".to_string());
        for variable in bound {
            let name = variable
                .name_str()
                .filter(|_| variable.kind() == AstKind::Name)
                .ok_or(MathmlWriteError::Unsupported(variable.kind()))?;
            self.line(level + 1, "<bvar>".to_string());
            self.line(level + 2, format!("<ci> {} </ci>", escape(name)));
            self.line(level + 1, "</bvar>".to_string());
        }
        self.write_node(body, level + 1)?;
        self.line(level, "</lambda>".to_string());
        Ok(())
    }

    fn write_extension(&mut self, node: &AstNode, level: usize) -> Result<(), MathmlWriteError> {
        let kind = node.kind();
        let AstKind::Extension(extension) = kind else {
            return Err(MathmlWriteError::Unsupported(kind));
        };
        let definition = self
            .extensions
            .definition(&extension)
            .ok_or(MathmlWriteError::UnregisteredExtension(kind))?;
        let head = match definition.form {
            ExtensionForm::Csymbol => format!(
                r#"<csymbol encoding="text" definitionURL="{}"> {} </csymbol>"#,
                escape(&definition.definition_url()),
                escape(extension.name)
            ),
            ExtensionForm::Element => format!(
                r#"<{} xmlns="{}"/>"#,
                extension.name,
                escape(definition.namespace)
            ),
        };
        self.write_applied(head, node.children(), level)
    }
}

pub(super) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod tests;
