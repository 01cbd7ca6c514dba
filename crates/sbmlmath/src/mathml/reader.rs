use regex::Regex;
use roxmltree::{Document, Node};
use sbmlmath_core::{Diagnostic, DiagnosticSink, NodePath};

use super::writer::escape;
use super::{MATHML_NS, SBML_SYMBOLS_NS, UNKNOWN_CSYMBOL, UNKNOWN_ELEMENT};
use crate::extension::{split_definition_url, ExtensionForm, ExtensionLookup, ExtensionRegistry};
use crate::kind::AstKind;
use crate::node::{AstNode, NodeError};
use crate::options::ConversionOptions;

#[derive(Debug, thiserror::Error)]
pub enum MathmlReadError {
    #[error("xml error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("malformed MathML at byte {offset}: {message}")]
    Structure { message: String, offset: usize },
    #[error("<{element}> at byte {offset} cannot take {count} operands")]
    Arity {
        element: String,
        count: usize,
        offset: usize,
    },
    #[error("MathML nested deeper than {limit} at byte {offset}")]
    DepthExceeded { limit: usize, offset: usize },
}

impl MathmlReadError {
    /// Byte offset into the document the error points at.
    pub fn offset(&self) -> Option<usize> {
        match self {
            MathmlReadError::Xml(_) => None,
            MathmlReadError::Structure { offset, .. }
            | MathmlReadError::Arity { offset, .. }
            | MathmlReadError::DepthExceeded { offset, .. } => Some(*offset),
        }
    }
}

/// Reads a `<math>` document, or a bare content element, into a tree.
///
/// Unrecognised vocabulary does not fail the read: it becomes an
/// [`AstKind::Unknown`] node holding the original markup, and one
/// diagnostic is emitted to `sink` for it.
pub fn read_mathml(input: &str, sink: &mut dyn DiagnosticSink) -> Result<AstNode, MathmlReadError> {
    read_mathml_with(input, &ExtensionRegistry::new(), &ConversionOptions::default(), sink)
}

pub fn read_mathml_with(
    input: &str,
    extensions: &dyn ExtensionLookup,
    options: &ConversionOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<AstNode, MathmlReadError> {
    tracing::debug!(len = input.len(), "reading MathML");
    let document = Document::parse(input)?;
    let mut reader = MathmlReader {
        input,
        extensions,
        max_depth: options.max_depth,
        sink,
        path: NodePath::root(),
    };

    let root = document.root_element();
    if is_mathml(root) && root.tag_name().name() == "math" {
        reader.path.push_element("math");
        let content = element_children(root)?;
        let [expression] = content.as_slice() else {
            return Err(structure(root, "<math> must hold exactly one expression"));
        };
        return reader.read_child(*expression, 0, 1);
    }
    reader.path.push_element(root.tag_name().name());
    reader.read_element(root, 1)
}

struct MathmlReader<'r> {
    input: &'r str,
    extensions: &'r dyn ExtensionLookup,
    max_depth: usize,
    sink: &'r mut dyn DiagnosticSink,
    path: NodePath,
}

impl MathmlReader<'_> {
    /// Reads the element child at `index` of the element the path points at.
    fn read_child(&mut self, node: Node, index: usize, depth: usize) -> Result<AstNode, MathmlReadError> {
        self.path.push_element(node.tag_name().name());
        self.path.push_index(index);
        let result = self.read_element(node, depth);
        self.path.pop();
        self.path.pop();
        result
    }

    fn read_children(&mut self, nodes: &[Node], depth: usize) -> Result<Vec<AstNode>, MathmlReadError> {
        nodes
            .iter()
            .enumerate()
            .map(|(index, child)| self.read_child(*child, index, depth + 1))
            .collect()
    }

    fn read_element(&mut self, node: Node, depth: usize) -> Result<AstNode, MathmlReadError> {
        if depth > self.max_depth {
            return Err(MathmlReadError::DepthExceeded {
                limit: self.max_depth,
                offset: node.range().start,
            });
        }
        if !is_mathml(node) {
            return self.read_foreign(node, depth);
        }

        let name = node.tag_name().name();
        match name {
            "apply" => self.read_apply(node, depth),
            "cn" => self.read_cn(node),
            "ci" => Ok(AstNode::name(identifier_text(node)?)),
            "csymbol" => self.read_csymbol(node, node, Vec::new()),
            "infinity" => Ok(AstNode::real(f64::INFINITY)),
            "notanumber" => Ok(AstNode::real(f64::NAN)),
            "piecewise" => self.read_piecewise(node, depth),
            "lambda" => self.read_lambda(node, depth),
            "piece" | "otherwise" | "logbase" => Err(structure(
                node,
                &format!("<{name}> outside of its parent construct"),
            )),
            _ => {
                if let Some(kind) = AstKind::from_constant_element(name) {
                    return Ok(AstNode::new(kind));
                }
                if let Some(kind) = AstKind::from_container_element(name) {
                    let operands = element_children(node)?;
                    let children = self.read_children(&operands, depth)?;
                    return build(kind, children, node);
                }
                Ok(self.unknown(node, node, UNKNOWN_ELEMENT, format!("unrecognised element <{name}>")))
            }
        }
    }

    fn read_apply(&mut self, node: Node, depth: usize) -> Result<AstNode, MathmlReadError> {
        let elements = element_children(node)?;
        let Some((head, operands)) = elements.split_first() else {
            return Err(structure(node, "<apply> without an operator"));
        };

        if !is_mathml(*head) {
            return match self.lookup_element(*head) {
                Some(kind) => {
                    let children = self.read_operands(operands, depth)?;
                    build(kind, children, node)
                }
                None => {
                    let message = format!("unrecognised operator <{}>", head.tag_name().name());
                    Ok(self.unknown(node, *head, UNKNOWN_ELEMENT, message))
                }
            };
        }

        let name = head.tag_name().name();
        match name {
            "ci" => {
                let function = identifier_text(*head)?;
                let arguments = self.read_operands(operands, depth)?;
                Ok(AstNode::function(function, arguments))
            }
            "csymbol" => {
                if !self.csymbol_is_known(*head)? {
                    let message = format!("unrecognised csymbol {}", definition_url(*head)?);
                    return Ok(self.unknown(node, *head, UNKNOWN_CSYMBOL, message));
                }
                let arguments = self.read_operands(operands, depth)?;
                self.read_csymbol(*head, node, arguments)
            }
            _ => match AstKind::from_operator_element(name) {
                Some(kind) => {
                    let children = self.read_qualified_operands(kind, operands, depth)?;
                    build(kind, children, node)
                }
                None => {
                    let message = format!("unrecognised operator <{name}>");
                    Ok(self.unknown(node, *head, UNKNOWN_ELEMENT, message))
                }
            },
        }
    }

    /// Operands of an `<apply>`; positions count the operator as 0.
    fn read_operands(&mut self, operands: &[Node], depth: usize) -> Result<Vec<AstNode>, MathmlReadError> {
        operands
            .iter()
            .enumerate()
            .map(|(index, operand)| self.read_child(*operand, index + 1, depth + 1))
            .collect()
    }

    /// `<root>` may lead with `<degree>` and `<log>` with `<logbase>`; the
    /// qualifier's content becomes the first child.
    fn read_qualified_operands(
        &mut self,
        kind: AstKind,
        operands: &[Node],
        depth: usize,
    ) -> Result<Vec<AstNode>, MathmlReadError> {
        let qualifier = match kind {
            AstKind::Root => "degree",
            AstKind::Log => "logbase",
            _ => return self.read_operands(operands, depth),
        };
        let Some((first, rest)) = operands.split_first() else {
            return Ok(Vec::new());
        };
        if !is_mathml(*first) || first.tag_name().name() != qualifier {
            return self.read_operands(operands, depth);
        }

        let inner = element_children(*first)?;
        let [value] = inner.as_slice() else {
            return Err(structure(*first, &format!("<{qualifier}> must hold exactly one expression")));
        };
        self.path.push_element(qualifier);
        self.path.push_index(1);
        let value = self.read_child(*value, 0, depth + 2);
        self.path.pop();
        self.path.pop();

        let mut children = vec![value?];
        for (index, operand) in rest.iter().enumerate() {
            children.push(self.read_child(*operand, index + 2, depth + 1)?);
        }
        Ok(children)
    }

    fn csymbol_is_known(&self, csymbol: Node) -> Result<bool, MathmlReadError> {
        let url = definition_url(csymbol)?;
        let (namespace, name) = split_definition_url(url);
        if namespace == SBML_SYMBOLS_NS && AstKind::from_sbml_symbol(name).is_some() {
            return Ok(true);
        }
        Ok(self.extensions.lookup(namespace, name, ExtensionForm::Csymbol).is_some())
    }

    /// Builds the node for a csymbol, bare (`arguments` empty, `node` is the
    /// csymbol) or applied (`node` is the enclosing `<apply>`).
    fn read_csymbol(&mut self, csymbol: Node, node: Node, arguments: Vec<AstNode>) -> Result<AstNode, MathmlReadError> {
        let url = definition_url(csymbol)?;
        let (namespace, name) = split_definition_url(url);
        if namespace == SBML_SYMBOLS_NS {
            if let Some(kind) = AstKind::from_sbml_symbol(name) {
                let text = element_text(csymbol);
                let label = if text.is_empty() { name } else { text.as_str() };
                let mut symbol = AstNode::symbol(kind, label);
                for argument in arguments {
                    symbol.add_child(argument).map_err(|err| arity(node, err))?;
                }
                symbol.validate().map_err(|err| arity(node, err))?;
                return Ok(symbol);
            }
        }
        match self.extensions.lookup(namespace, name, ExtensionForm::Csymbol) {
            Some(definition) => build(AstKind::Extension(definition.kind), arguments, node),
            None => Ok(self.unknown(node, csymbol, UNKNOWN_CSYMBOL, format!("unrecognised csymbol {url}"))),
        }
    }

    fn read_foreign(&mut self, node: Node, depth: usize) -> Result<AstNode, MathmlReadError> {
        match self.lookup_element(node) {
            Some(kind) => {
                let operands = element_children(node)?;
                let children = self.read_children(&operands, depth)?;
                build(kind, children, node)
            }
            None => {
                let message = format!(
                    "unrecognised element <{}> in namespace {}",
                    node.tag_name().name(),
                    node.tag_name().namespace().unwrap_or_default()
                );
                Ok(self.unknown(node, node, UNKNOWN_ELEMENT, message))
            }
        }
    }

    fn lookup_element(&self, node: Node) -> Option<AstKind> {
        let namespace = node.tag_name().namespace().unwrap_or_default();
        self.extensions
            .lookup(namespace, node.tag_name().name(), ExtensionForm::Element)
            .map(|definition| AstKind::Extension(definition.kind))
    }

    fn read_cn(&mut self, node: Node) -> Result<AstNode, MathmlReadError> {
        let parts = cn_parts(node)?;
        let Some(encoding) = node.attribute("type").map(str::trim) else {
            // An untyped integer literal reads as an integer.
            return match parts.as_slice() {
                [value] => match value.parse::<i64>() {
                    Ok(value) => Ok(AstNode::integer(value)),
                    Err(_) => parse_real(value)
                        .map(AstNode::real)
                        .ok_or_else(|| invalid_value(node, value)),
                },
                _ => Err(structure(node, "<cn> needs exactly one value")),
            };
        };
        match (encoding, parts.as_slice()) {
            ("integer", [value]) => match value.parse::<i64>() {
                Ok(value) => Ok(AstNode::integer(value)),
                Err(_) => value
                    .parse::<f64>()
                    .map(AstNode::real)
                    .map_err(|_| invalid_value(node, value)),
            },
            ("real" | "double", [value]) => {
                parse_real(value).map(AstNode::real).ok_or_else(|| invalid_value(node, value))
            }
            ("e-notation", [mantissa, exponent]) => {
                let mantissa = parse_real(mantissa).ok_or_else(|| invalid_value(node, mantissa))?;
                let exponent = exponent
                    .parse::<i64>()
                    .map_err(|_| invalid_value(node, exponent))?;
                Ok(AstNode::real_e(mantissa, exponent))
            }
            ("rational", [numerator, denominator]) => {
                let numerator = numerator
                    .parse::<i64>()
                    .map_err(|_| invalid_value(node, numerator))?;
                let denominator = denominator
                    .parse::<i64>()
                    .map_err(|_| invalid_value(node, denominator))?;
                Ok(AstNode::rational(numerator, denominator))
            }
            ("integer" | "real" | "double", _) => Err(structure(
                node,
                &format!("<cn type=\"{encoding}\"> needs exactly one value"),
            )),
            ("e-notation" | "rational", _) => Err(structure(
                node,
                &format!("<cn type=\"{encoding}\"> needs two values separated by <sep/>"),
            )),
            _ => {
                let message = format!("unsupported <cn> type \"{encoding}\"");
                Ok(self.unknown(node, node, UNKNOWN_ELEMENT, message))
            }
        }
    }

    fn read_piecewise(&mut self, node: Node, depth: usize) -> Result<AstNode, MathmlReadError> {
        let elements = element_children(node)?;
        let mut children = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let name = element.tag_name().name();
            let expected = match name {
                "piece" => 2,
                "otherwise" if index + 1 == elements.len() => 1,
                "otherwise" => return Err(structure(*element, "<otherwise> must come last")),
                _ => return Err(structure(*element, &format!("unexpected <{name}> in <piecewise>"))),
            };
            let parts = element_children(*element)?;
            if parts.len() != expected {
                return Err(structure(
                    *element,
                    &format!("<{name}> must hold {expected} expression(s)"),
                ));
            }
            self.path.push_element(name);
            self.path.push_index(index);
            let read = self.read_children(&parts, depth + 1);
            self.path.pop();
            self.path.pop();
            children.extend(read?);
        }
        build(AstKind::Piecewise, children, node)
    }

    fn read_lambda(&mut self, node: Node, depth: usize) -> Result<AstNode, MathmlReadError> {
        let elements = element_children(node)?;
        let mut children = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let is_bvar = is_mathml(*element) && element.tag_name().name() == "bvar";
            if !is_bvar {
                if index + 1 != elements.len() {
                    return Err(structure(*element, "<lambda> body must follow all <bvar> elements"));
                }
                children.push(self.read_child(*element, index, depth + 1)?);
                continue;
            }
            let inner = element_children(*element)?;
            let [variable] = inner.as_slice() else {
                return Err(structure(*element, "<bvar> must hold exactly one <ci>"));
            };
            if variable.tag_name().name() != "ci" {
                return Err(structure(*variable, "<bvar> must hold a <ci>"));
            }
            children.push(AstNode::name(identifier_text(*variable)?));
        }
        build(AstKind::Lambda, children, node)
    }

    /// Keeps `node`'s markup verbatim and reports `culprit`.
    fn unknown(&mut self, node: Node, culprit: Node, code: &str, message: String) -> AstNode {
        let offset = culprit.range().start;
        tracing::warn!(code, offset, path = %self.path, "{message}");
        self.sink.emit(
            Diagnostic::warning(code, message)
                .with_offset(offset)
                .with_path(self.path.clone()),
        );
        AstNode::unknown(detached_markup(self.input, node))
    }
}

const XMLNS_ATTRIBUTE: &str = r"\sxmlns(?::([^\s=/>]+))?\s*=";

/// `node`'s markup with the namespace declarations it inherits from its
/// ancestors written onto its start tag, so the text parses on its own.
fn detached_markup(input: &str, node: Node) -> String {
    let raw = &input[node.range()];
    let start_tag = &raw[..start_tag_end(raw)];
    let declared = Regex::new(XMLNS_ATTRIBUTE)
        .expect("valid regex")
        .captures_iter(start_tag)
        .map(|captures| captures.get(1).map(|prefix| prefix.as_str()))
        .collect::<Vec<_>>();

    let mut declarations = String::new();
    for namespace in node.namespaces() {
        let prefix = namespace.name();
        if prefix == Some("xml") || declared.contains(&prefix) {
            continue;
        }
        let uri = escape(namespace.uri());
        match prefix {
            Some(prefix) => declarations.push_str(&format!(" xmlns:{prefix}=\"{uri}\"")),
            None => declarations.push_str(&format!(" xmlns=\"{uri}\"")),
        }
    }
    if declarations.is_empty() {
        return raw.to_string();
    }
    let name_end = raw
        .char_indices()
        .skip(1)
        .find(|(_, ch)| ch.is_whitespace() || matches!(ch, '/' | '>'))
        .map_or(raw.len(), |(index, _)| index);
    format!("{}{declarations}{}", &raw[..name_end], &raw[name_end..])
}

/// Byte index of the `>` closing the first tag in `raw`.
fn start_tag_end(raw: &str) -> usize {
    let mut quote = None;
    for (index, ch) in raw.char_indices() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if matches!(ch, '"' | '\'') => quote = Some(ch),
            None if ch == '>' => return index,
            None => {}
        }
    }
    raw.len()
}

fn is_mathml(node: Node) -> bool {
    matches!(node.tag_name().namespace(), None | Some(MATHML_NS))
}

/// Element children of `node`; text other than whitespace is malformed.
fn element_children<'a, 'input>(node: Node<'a, 'input>) -> Result<Vec<Node<'a, 'input>>, MathmlReadError> {
    let mut elements = Vec::new();
    for child in node.children() {
        if child.is_element() {
            elements.push(child);
        } else if child.is_text() && !child.text().unwrap_or_default().trim().is_empty() {
            return Err(structure(child, &format!("unexpected text in <{}>", node.tag_name().name())));
        }
    }
    Ok(elements)
}

fn element_text(node: Node) -> String {
    node.descendants()
        .filter(|descendant| descendant.is_text())
        .filter_map(|descendant| descendant.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn identifier_text(node: Node) -> Result<String, MathmlReadError> {
    let text = element_text(node);
    if text.is_empty() {
        return Err(structure(node, &format!("empty <{}>", node.tag_name().name())));
    }
    Ok(text)
}

fn definition_url<'a>(node: Node<'a, '_>) -> Result<&'a str, MathmlReadError> {
    node.attribute("definitionURL")
        .map(str::trim)
        .ok_or_else(|| structure(node, "<csymbol> without definitionURL"))
}

/// Text of a `<cn>` split at its `<sep/>` markers.
fn cn_parts(node: Node) -> Result<Vec<String>, MathmlReadError> {
    let mut parts = vec![String::new()];
    for child in node.children() {
        if child.is_text() {
            if let (Some(current), Some(text)) = (parts.last_mut(), child.text()) {
                current.push_str(text);
            }
        } else if child.is_element() {
            if child.tag_name().name() != "sep" {
                return Err(structure(child, "only <sep/> may appear inside <cn>"));
            }
            parts.push(String::new());
        }
    }
    Ok(parts
        .into_iter()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect())
}

fn parse_real(text: &str) -> Option<f64> {
    match text {
        "INF" | "inf" | "infinity" | "Infinity" => Some(f64::INFINITY),
        "-INF" | "-inf" | "-infinity" | "-Infinity" => Some(f64::NEG_INFINITY),
        "NaN" | "nan" | "notanumber" => Some(f64::NAN),
        _ => text.parse::<f64>().ok(),
    }
}

fn build(kind: AstKind, children: Vec<AstNode>, node: Node) -> Result<AstNode, MathmlReadError> {
    AstNode::with_children(kind, children).map_err(|err| arity(node, err))
}

fn arity(node: Node, err: NodeError) -> MathmlReadError {
    match err {
        NodeError::Arity { count, kind, .. } => MathmlReadError::Arity {
            element: kind.to_string(),
            count,
            offset: node.range().start,
        },
        other => structure(node, &other.to_string()),
    }
}

fn structure(node: Node, message: &str) -> MathmlReadError {
    MathmlReadError::Structure {
        message: message.to_string(),
        offset: node.range().start,
    }
}

fn invalid_value(node: Node, value: &str) -> MathmlReadError {
    structure(node, &format!("invalid number `{value}`"))
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;
