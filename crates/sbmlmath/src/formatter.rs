use regex::Regex;

use crate::kind::{AstKind, KindGroup};
use crate::node::AstNode;
use crate::options::ConversionOptions;

const NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*$";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("{0} has no infix form")]
    Unsupported(AstKind),
    #[error("`{0}` cannot be written as an infix name")]
    InvalidName(String),
    #[error("{kind} with {count} children cannot be written")]
    Arity { kind: AstKind, count: usize },
    #[error("tree nested deeper than {limit}")]
    DepthExceeded { limit: usize },
}

pub fn format_formula(node: &AstNode) -> Result<String, FormatError> {
    format_formula_with_options(node, &ConversionOptions::default())
}

pub fn format_formula_with_options(
    node: &AstNode,
    options: &ConversionOptions,
) -> Result<String, FormatError> {
    let mut formatter = InfixFormatter {
        out: String::new(),
        names: Regex::new(NAME_PATTERN).expect("valid regex"),
        max_depth: options.max_depth,
    };
    formatter.write_node(node, 1)?;
    tracing::debug!(len = formatter.out.len(), "formatted infix formula");
    Ok(formatter.out)
}

// Binding strength, loosest first.
const SUM: u8 = 1;
const PRODUCT: u8 = 2;
const POWER: u8 = 3;
const NEGATION: u8 = 4;
const ATOM: u8 = 5;

fn precedence(node: &AstNode) -> u8 {
    let count = node.num_children();
    match node.kind() {
        AstKind::Plus if count >= 2 => SUM,
        AstKind::Minus if count == 2 => SUM,
        AstKind::Minus => NEGATION,
        AstKind::Times if count >= 2 => PRODUCT,
        AstKind::Divide => PRODUCT,
        AstKind::Power => POWER,
        _ if is_negative_literal(node) => NEGATION,
        _ => ATOM,
    }
}

fn is_negative_literal(node: &AstNode) -> bool {
    match node.kind() {
        AstKind::Integer => node.integer_value().is_some_and(|value| value < 0),
        AstKind::Real => node
            .real_value()
            .is_some_and(|value| value.is_sign_negative() && !value.is_nan()),
        AstKind::RealE => node
            .real_e_value()
            .is_some_and(|(mantissa, _)| mantissa.is_sign_negative() && !mantissa.is_nan()),
        _ => false,
    }
}

/// Whether `child`, sitting at `index` under `parent`, must be wrapped.
fn needs_parens(parent: &AstNode, index: usize, child: &AstNode) -> bool {
    let outer = precedence(parent);
    let inner = precedence(child);
    if inner != outer {
        return inner < outer;
    }
    match parent.kind() {
        // A same-kind first operand would otherwise merge into the parent.
        AstKind::Plus | AstKind::Times => index > 0 || child.kind() == parent.kind(),
        AstKind::Minus | AstKind::Divide => index > 0,
        AstKind::Power => index == 0,
        _ => false,
    }
}

struct InfixFormatter {
    out: String,
    names: Regex,
    max_depth: usize,
}

impl InfixFormatter {
    fn write_node(&mut self, node: &AstNode, depth: usize) -> Result<(), FormatError> {
        if depth > self.max_depth {
            return Err(FormatError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        let kind = node.kind();
        if !kind.is_infix_expressible() {
            return Err(FormatError::Unsupported(kind));
        }
        let count = node.num_children();
        if !kind.arity().allows(count) {
            return Err(FormatError::Arity { kind, count });
        }

        match kind {
            AstKind::Plus | AstKind::Times if count >= 2 => {
                let separator = if kind == AstKind::Plus { " + " } else { " * " };
                self.write_operands(node, separator, depth)
            }
            AstKind::Minus | AstKind::Divide | AstKind::Power if count == 2 => {
                let separator = match kind {
                    AstKind::Minus => " - ",
                    AstKind::Divide => " / ",
                    _ => "^",
                };
                self.write_operands(node, separator, depth)
            }
            AstKind::Minus => self.write_negation(node, depth),
            AstKind::Integer | AstKind::Real | AstKind::RealE | AstKind::Rational => {
                self.write_number(node)
            }
            AstKind::Name => {
                let name = node.name_str().unwrap_or_default();
                if reads_as_literal(name) || AstKind::from_reserved_name(name).is_some() {
                    return Err(FormatError::InvalidName(name.to_string()));
                }
                self.write_name(name)
            }
            AstKind::Function => {
                let name = node.name_str().unwrap_or_default();
                if !self.names.is_match(name) || AstKind::from_function_name(name).is_some() {
                    return Err(FormatError::InvalidName(name.to_string()));
                }
                self.write_call(name, node.children(), depth)
            }
            AstKind::Log if count == 1 => self.write_call("log10", node.children(), depth),
            AstKind::Root if count == 1 => self.write_call("sqrt", node.children(), depth),
            _ => {
                let keyword = kind.infix_keyword().ok_or(FormatError::Unsupported(kind))?;
                // the parser labels symbols with their keyword
                if let Some(label) = node
                    .name_str()
                    .filter(|label| !label.is_empty() && *label != keyword)
                {
                    return Err(FormatError::InvalidName(label.to_string()));
                }
                if matches!(kind.group(), KindGroup::Name | KindGroup::Constant) {
                    self.out.push_str(keyword);
                    Ok(())
                } else {
                    self.write_call(keyword, node.children(), depth)
                }
            }
        }
    }

    fn write_operands(&mut self, node: &AstNode, separator: &str, depth: usize) -> Result<(), FormatError> {
        for (index, child) in node.children().iter().enumerate() {
            if index > 0 {
                self.out.push_str(separator);
            }
            self.write_operand(node, index, child, depth)?;
        }
        Ok(())
    }

    fn write_operand(&mut self, parent: &AstNode, index: usize, child: &AstNode, depth: usize) -> Result<(), FormatError> {
        if needs_parens(parent, index, child) {
            self.out.push('(');
            self.write_node(child, depth + 1)?;
            self.out.push(')');
            Ok(())
        } else {
            self.write_node(child, depth + 1)
        }
    }

    fn write_negation(&mut self, node: &AstNode, depth: usize) -> Result<(), FormatError> {
        self.out.push('-');
        let Some(operand) = node.child(0) else {
            return Err(FormatError::Arity {
                kind: node.kind(),
                count: 0,
            });
        };
        // `-3` would read back as a negative literal
        let literal = matches!(
            operand.kind(),
            AstKind::Integer | AstKind::Real | AstKind::RealE
        );
        if literal {
            self.out.push('(');
            self.write_node(operand, depth + 1)?;
            self.out.push(')');
            return Ok(());
        }
        self.write_operand(node, 0, operand, depth)
    }

    fn write_number(&mut self, node: &AstNode) -> Result<(), FormatError> {
        if let Some(value) = node.integer_value() {
            self.out.push_str(&value.to_string());
        } else if let Some(value) = node.real_value() {
            self.out.push_str(&format_real(value));
        } else if let Some((mantissa, exponent)) = node.real_e_value() {
            if !mantissa.is_finite() {
                return Err(FormatError::Unsupported(node.kind()));
            }
            self.out.push_str(&format!("{mantissa}e{exponent}"));
        } else if let Some((numerator, denominator)) = node.rational_value() {
            self.out.push_str(&format!("({numerator}/{denominator})"));
        }
        Ok(())
    }

    fn write_name(&mut self, name: &str) -> Result<(), FormatError> {
        if !self.names.is_match(name) {
            return Err(FormatError::InvalidName(name.to_string()));
        }
        self.out.push_str(name);
        Ok(())
    }

    fn write_call(&mut self, name: &str, arguments: &[AstNode], depth: usize) -> Result<(), FormatError> {
        self.out.push_str(name);
        self.out.push('(');
        for (index, argument) in arguments.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.write_node(argument, depth + 1)?;
        }
        self.out.push(')');
        Ok(())
    }
}

/// Identifiers the parser turns into real literals.
fn reads_as_literal(name: &str) -> bool {
    matches!(name, "INF" | "inf" | "infinity" | "NaN" | "notanumber")
}

/// Shortest text that reads back as the same real, always with a decimal
/// point so it stays a real.
pub(crate) fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

#[cfg(test)]
#[path = "formatter_test.rs"]
mod tests;
