//! The immutable node arena.

use crate::ast::{Node, NodeKind};
use crate::{Name, NodeId, NodeRange, SharedInterner, Span};
use std::fmt;

/// A parsed source: a flat arena of nodes rooted at a `Program`.
///
/// Never mutated after construction. Lookups of `INVALID` or out-of-range
/// ids return `None`, which keeps every pass total over partial trees.
pub struct Ast {
    nodes: Vec<Node>,
    lists: Vec<NodeId>,
    root: NodeId,
    interner: SharedInterner,
}

impl Ast {
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        lists: Vec<NodeId>,
        root: NodeId,
        interner: SharedInterner,
    ) -> Self {
        Ast {
            nodes,
            lists,
            root,
            interner,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_valid() {
            self.nodes.get(id.index())
        } else {
            None
        }
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).map_or(Span::DUMMY, |node| node.span)
    }

    /// Ids stored in a child list. Ranges from another tree read as empty.
    pub fn list(&self, range: NodeRange) -> &[NodeId] {
        let start = range.start as usize;
        self.lists.get(start..start + range.len()).unwrap_or(&[])
    }

    pub(crate) fn lists(&self) -> &[NodeId] {
        &self.lists
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Text of an interned name.
    pub fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Every node id, in allocation order (children before parents).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter_map(|index| u32::try_from(index).ok().map(NodeId::new))
    }

    /// The body of the root program, if the tree has one.
    pub fn body(&self) -> Option<NodeId> {
        match self.kind(self.root) {
            Some(NodeKind::Program { body }) if body.is_valid() => Some(*body),
            _ => None,
        }
    }
}

impl fmt::Debug for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ast")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
