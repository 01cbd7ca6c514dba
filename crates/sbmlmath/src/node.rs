use crate::extension::ExtensionKind;
use crate::kind::{Arity, AstKind, PayloadClass};

/// Per-kind data carried by a node besides its children.
#[derive(Debug, Clone)]
pub enum Payload {
    None,
    Integer(i64),
    Real(f64),
    RealE { mantissa: f64, exponent: i64 },
    /// Stored as written, never reduced.
    Rational { numerator: i64, denominator: i64 },
    Name(String),
    /// Verbatim XML of an element the reader did not recognise.
    Raw(String),
}

impl Payload {
    fn default_for(class: PayloadClass) -> Self {
        match class {
            PayloadClass::None => Payload::None,
            PayloadClass::Integer => Payload::Integer(0),
            PayloadClass::Real => Payload::Real(0.0),
            PayloadClass::RealE => Payload::RealE {
                mantissa: 0.0,
                exponent: 0,
            },
            PayloadClass::Rational => Payload::Rational {
                numerator: 0,
                denominator: 1,
            },
            PayloadClass::Name => Payload::Name(String::new()),
            PayloadClass::Raw => Payload::Raw(String::new()),
        }
    }

    fn class(&self) -> PayloadClass {
        match self {
            Payload::None => PayloadClass::None,
            Payload::Integer(_) => PayloadClass::Integer,
            Payload::Real(_) => PayloadClass::Real,
            Payload::RealE { .. } => PayloadClass::RealE,
            Payload::Rational { .. } => PayloadClass::Rational,
            Payload::Name(_) => PayloadClass::Name,
            Payload::Raw(_) => PayloadClass::Raw,
        }
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::None, Payload::None) => true,
            (Payload::Integer(left), Payload::Integer(right)) => left == right,
            (Payload::Real(left), Payload::Real(right)) => same_real(*left, *right),
            (
                Payload::RealE {
                    mantissa: left_mantissa,
                    exponent: left_exponent,
                },
                Payload::RealE {
                    mantissa: right_mantissa,
                    exponent: right_exponent,
                },
            ) => same_real(*left_mantissa, *right_mantissa) && left_exponent == right_exponent,
            (
                Payload::Rational {
                    numerator: left_numerator,
                    denominator: left_denominator,
                },
                Payload::Rational {
                    numerator: right_numerator,
                    denominator: right_denominator,
                },
            ) => left_numerator == right_numerator && left_denominator == right_denominator,
            (Payload::Name(left), Payload::Name(right)) => left == right,
            (Payload::Raw(left), Payload::Raw(right)) => left == right,
            _ => false,
        }
    }
}

// NaN equals NaN and 0.0 differs from -0.0: equality here means "same literal".
fn same_real(left: f64, right: f64) -> bool {
    (left.is_nan() && right.is_nan()) || left.to_bits() == right.to_bits()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("{kind} takes {arity} children, got {count}")]
    Arity {
        kind: AstKind,
        arity: Arity,
        count: usize,
    },
    #[error("lambda child {index} must be a bound variable name")]
    BoundVariable { index: usize },
    #[error("child index {index} out of range for {count} children")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("{kind} carries no name")]
    NoName { kind: AstKind },
}

/// A formula tree node. Each node exclusively owns its children; cloning
/// copies the whole subtree.
#[derive(Debug, Clone)]
pub struct AstNode {
    kind: AstKind,
    payload: Payload,
    children: Vec<AstNode>,
}

impl AstNode {
    /// An empty node of `kind` with that kind's default payload.
    pub fn new(kind: AstKind) -> Self {
        Self {
            kind,
            payload: Payload::default_for(kind.payload_class()),
            children: Vec::new(),
        }
    }

    /// A node whose children must satisfy `kind`'s arity in full.
    pub fn with_children(kind: AstKind, children: Vec<AstNode>) -> Result<Self, NodeError> {
        check_children(kind, &children)?;
        Ok(Self {
            kind,
            payload: Payload::default_for(kind.payload_class()),
            children,
        })
    }

    pub fn integer(value: i64) -> Self {
        Self::leaf(AstKind::Integer, Payload::Integer(value))
    }

    pub fn real(value: f64) -> Self {
        Self::leaf(AstKind::Real, Payload::Real(value))
    }

    pub fn real_e(mantissa: f64, exponent: i64) -> Self {
        Self::leaf(AstKind::RealE, Payload::RealE { mantissa, exponent })
    }

    pub fn rational(numerator: i64, denominator: i64) -> Self {
        Self::leaf(
            AstKind::Rational,
            Payload::Rational {
                numerator,
                denominator,
            },
        )
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::leaf(AstKind::Name, Payload::Name(name.into()))
    }

    /// A call of a user-defined function.
    pub fn function(name: impl Into<String>, arguments: Vec<AstNode>) -> Self {
        Self {
            kind: AstKind::Function,
            payload: Payload::Name(name.into()),
            children: arguments,
        }
    }

    /// A childless node of `kind` carrying `name` when the kind has a name
    /// slot (`time`, `avogadro`); other kinds ignore it.
    pub fn symbol(kind: AstKind, name: impl Into<String>) -> Self {
        let mut node = Self::new(kind);
        if let Payload::Name(slot) = &mut node.payload {
            *slot = name.into();
        }
        node
    }

    pub fn unknown(raw: impl Into<String>) -> Self {
        Self::leaf(AstKind::Unknown, Payload::Raw(raw.into()))
    }

    pub fn extension(kind: ExtensionKind, children: Vec<AstNode>) -> Result<Self, NodeError> {
        Self::with_children(AstKind::Extension(kind), children)
    }

    fn leaf(kind: AstKind, payload: Payload) -> Self {
        Self {
            kind,
            payload,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> AstKind {
        self.kind
    }

    pub fn arity(&self) -> Arity {
        self.kind.arity()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn integer_value(&self) -> Option<i64> {
        match self.payload {
            Payload::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn real_value(&self) -> Option<f64> {
        match self.payload {
            Payload::Real(value) => Some(value),
            _ => None,
        }
    }

    pub fn real_e_value(&self) -> Option<(f64, i64)> {
        match self.payload {
            Payload::RealE { mantissa, exponent } => Some((mantissa, exponent)),
            _ => None,
        }
    }

    pub fn rational_value(&self) -> Option<(i64, i64)> {
        match self.payload {
            Payload::Rational {
                numerator,
                denominator,
            } => Some((numerator, denominator)),
            _ => None,
        }
    }

    pub fn name_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Name(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn raw_xml(&self) -> Option<&str> {
        match &self.payload {
            Payload::Raw(raw) => Some(raw.as_str()),
            _ => None,
        }
    }

    /// Children in order. Edits go through the checked methods below, so
    /// there is no public mutable view:
    ///
    /// ```compile_fail
    /// let mut lambda = sbmlmath::AstNode::new(sbmlmath::AstKind::Lambda);
    /// let _ = lambda.children_mut();
    /// ```
    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    /// Children for in-place editing; the count cannot change through
    /// this view.
    pub(crate) fn children_mut(&mut self) -> &mut [AstNode] {
        &mut self.children
    }

    pub fn child(&self, index: usize) -> Option<&AstNode> {
        self.children.get(index)
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Changes the kind, keeping the payload when both kinds carry the same
    /// sort of payload. Fails without touching the node when the current
    /// children do not fit the new kind's arity.
    pub fn set_kind(&mut self, kind: AstKind) -> Result<(), NodeError> {
        check_children(kind, &self.children)?;
        if self.payload.class() != kind.payload_class() {
            self.payload = Payload::default_for(kind.payload_class());
        }
        self.kind = kind;
        Ok(())
    }

    pub fn set_integer(&mut self, value: i64) -> Result<(), NodeError> {
        self.set_number(AstKind::Integer, Payload::Integer(value))
    }

    pub fn set_real(&mut self, value: f64) -> Result<(), NodeError> {
        self.set_number(AstKind::Real, Payload::Real(value))
    }

    pub fn set_real_e(&mut self, mantissa: f64, exponent: i64) -> Result<(), NodeError> {
        self.set_number(AstKind::RealE, Payload::RealE { mantissa, exponent })
    }

    pub fn set_rational(&mut self, numerator: i64, denominator: i64) -> Result<(), NodeError> {
        self.set_number(
            AstKind::Rational,
            Payload::Rational {
                numerator,
                denominator,
            },
        )
    }

    fn set_number(&mut self, kind: AstKind, payload: Payload) -> Result<(), NodeError> {
        check_children(kind, &self.children)?;
        self.kind = kind;
        self.payload = payload;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), NodeError> {
        match &mut self.payload {
            Payload::Name(current) => {
                *current = name.into();
                Ok(())
            }
            _ => Err(NodeError::NoName { kind: self.kind }),
        }
    }

    pub fn add_child(&mut self, child: AstNode) -> Result<(), NodeError> {
        self.insert_child(self.children.len(), child)
    }

    /// Inserts `child` before position `index`. Fails without touching the
    /// node if the count would exceed the kind's maximum.
    pub fn insert_child(&mut self, index: usize, child: AstNode) -> Result<(), NodeError> {
        if index > self.children.len() {
            return Err(NodeError::IndexOutOfRange {
                index,
                count: self.children.len(),
            });
        }
        let arity = self.kind.arity();
        if arity.max().is_some_and(|max| self.children.len() + 1 > max) {
            return Err(NodeError::Arity {
                kind: self.kind,
                arity,
                count: self.children.len() + 1,
            });
        }
        if self.kind == AstKind::Lambda {
            let mut shape = self.children.iter().map(AstNode::kind).collect::<Vec<_>>();
            shape.insert(index, child.kind);
            check_lambda_shape(&shape)?;
        }
        self.children.insert(index, child);
        Ok(())
    }

    /// Removes and returns the child at `index`. Fails without touching the
    /// node if the count would drop below the kind's minimum.
    pub fn remove_child(&mut self, index: usize) -> Result<AstNode, NodeError> {
        self.check_index(index)?;
        let arity = self.kind.arity();
        if self.children.len() - 1 < arity.min() {
            return Err(NodeError::Arity {
                kind: self.kind,
                arity,
                count: self.children.len() - 1,
            });
        }
        if self.kind == AstKind::Lambda {
            let mut shape = self.children.iter().map(AstNode::kind).collect::<Vec<_>>();
            shape.remove(index);
            check_lambda_shape(&shape)?;
        }
        Ok(self.children.remove(index))
    }

    /// Swaps in `child` at `index` and returns the node it replaced.
    pub fn replace_child(&mut self, index: usize, child: AstNode) -> Result<AstNode, NodeError> {
        self.check_index(index)?;
        if self.kind == AstKind::Lambda {
            let mut shape = self.children.iter().map(AstNode::kind).collect::<Vec<_>>();
            shape[index] = child.kind;
            check_lambda_shape(&shape)?;
        }
        Ok(std::mem::replace(&mut self.children[index], child))
    }

    pub fn swap_children(&mut self, first: usize, second: usize) -> Result<(), NodeError> {
        self.check_index(first)?;
        self.check_index(second)?;
        if self.kind == AstKind::Lambda {
            let mut shape = self.children.iter().map(AstNode::kind).collect::<Vec<_>>();
            shape.swap(first, second);
            check_lambda_shape(&shape)?;
        }
        self.children.swap(first, second);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), NodeError> {
        if index >= self.children.len() {
            return Err(NodeError::IndexOutOfRange {
                index,
                count: self.children.len(),
            });
        }
        Ok(())
    }

    /// Checks every node of the tree against its kind's arity.
    pub fn validate(&self) -> Result<(), NodeError> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            check_children(node.kind, &node.children)?;
            pending.extend(node.children.iter());
        }
        Ok(())
    }

    /// Compares kind, payload and children, in order, over the whole tree.
    pub fn structurally_equal(&self, other: &AstNode) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.kind != right.kind
                || left.payload != right.payload
                || left.children.len() != right.children.len()
            {
                return false;
            }
            pending.extend(left.children.iter().zip(right.children.iter()));
        }
        true
    }

    /// Length of the longest root-to-leaf chain, counting nodes.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    pub fn contains_kind(&self, kind: AstKind) -> bool {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.kind == kind {
                return true;
            }
            pending.extend(node.children.iter());
        }
        false
    }

    /// Distinct identifiers referenced by `Name` nodes, in reading order.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.kind == AstKind::Name {
                if let Some(name) = node.name_str() {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
            pending.extend(node.children.iter().rev());
        }
        names
    }

    /// Renames identifiers and user function calls equal to `from`.
    /// Returns how many nodes changed.
    pub fn rename_references(&mut self, from: &str, to: &str) -> usize {
        let mut renamed = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if matches!(node.kind, AstKind::Name | AstKind::Function) {
                if let Payload::Name(name) = &mut node.payload {
                    if name == from {
                        *name = to.to_string();
                        renamed += 1;
                    }
                }
            }
            pending.extend(node.children.iter_mut());
        }
        renamed
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_equal(other)
    }
}

impl Drop for AstNode {
    // Flattens the subtree first so deep chains never recurse.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

fn check_children(kind: AstKind, children: &[AstNode]) -> Result<(), NodeError> {
    let arity = kind.arity();
    let count = children.len();
    if !arity.allows(count) {
        return Err(NodeError::Arity { kind, arity, count });
    }
    if kind == AstKind::Lambda {
        let shape = children.iter().map(AstNode::kind).collect::<Vec<_>>();
        check_lambda_shape(&shape)?;
    }
    Ok(())
}

fn check_lambda_shape(kinds: &[AstKind]) -> Result<(), NodeError> {
    let bound = kinds.len().saturating_sub(1);
    match kinds[..bound].iter().position(|kind| *kind != AstKind::Name) {
        Some(index) => Err(NodeError::BoundVariable { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod tests;
