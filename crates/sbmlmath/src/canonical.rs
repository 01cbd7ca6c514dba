//! Rewrites generic nodes into the specific kinds they spell, using the
//! SBML Level 3 Version 2 keyword table. Only kinds and names change;
//! children keep their count and order.

use crate::extension::ExtensionLookup;
use crate::kind::AstKind;
use crate::node::AstNode;

/// Canonicalises `node` in place and returns how many nodes were rewritten.
pub fn canonicalize(node: &mut AstNode) -> usize {
    canonicalize_tree(node, None)
}

/// Like [`canonicalize`], also turning calls of registered extension
/// functions into extension nodes.
pub fn canonicalize_with_extensions(node: &mut AstNode, extensions: &dyn ExtensionLookup) -> usize {
    canonicalize_tree(node, Some(extensions))
}

fn canonicalize_tree(node: &mut AstNode, extensions: Option<&dyn ExtensionLookup>) -> usize {
    let mut rewritten = 0;
    let mut pending = vec![node];
    while let Some(current) = pending.pop() {
        if let Some(kind) = canonical_kind(current, extensions) {
            let from = current.kind();
            match current.set_kind(kind) {
                Ok(()) => {
                    tracing::trace!(%from, to = %kind, "canonicalised node");
                    rewritten += 1;
                }
                Err(err) => tracing::debug!(%err, "kept generic node"),
            }
        }
        if current.kind() == AstKind::Lambda {
            // bound variables stay plain names
            if let Some(body) = current.children_mut().last_mut() {
                pending.push(body);
            }
        } else {
            pending.extend(current.children_mut().iter_mut());
        }
    }
    rewritten
}

fn canonical_kind(node: &AstNode, extensions: Option<&dyn ExtensionLookup>) -> Option<AstKind> {
    let name = node.name_str()?;
    match node.kind() {
        AstKind::Name => AstKind::from_reserved_name(name),
        AstKind::Function => {
            let count = node.num_children();
            if let Some(kind) = AstKind::from_function_name(name) {
                let alias_fits = !matches!(name, "sqrt" | "log10") || count == 1;
                if kind.arity().allows(count) && alias_fits && lambda_shape_fits(kind, node) {
                    return Some(kind);
                }
            }
            let definition = extensions?.lookup_function(name)?;
            definition
                .kind
                .arity
                .allows(count)
                .then_some(AstKind::Extension(definition.kind))
        }
        _ => None,
    }
}

fn lambda_shape_fits(kind: AstKind, node: &AstNode) -> bool {
    if kind != AstKind::Lambda {
        return true;
    }
    let bound = node.num_children().saturating_sub(1);
    node.children()[..bound]
        .iter()
        .all(|child| child.kind() == AstKind::Name)
}

#[cfg(test)]
#[path = "canonical_test.rs"]
mod tests;
