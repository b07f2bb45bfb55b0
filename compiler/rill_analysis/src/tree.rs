//! Parent links for a syntax tree.
//!
//! Nodes only know their children. Resolution walks outward, so analysis
//! builds this index once per tree and throws it away with the tree.

use rill_ir::{Ast, NodeId};

pub struct Tree {
    /// Indexed by `NodeId`; `INVALID` for the root and unreachable nodes.
    parents: Vec<NodeId>,
}

impl Tree {
    pub fn new(ast: &Ast) -> Self {
        let mut parents = vec![NodeId::INVALID; ast.len()];
        for parent in ast.descendants(ast.root()) {
            for child in ast.children(parent) {
                if let Some(slot) = parents.get_mut(child.index()) {
                    *slot = parent;
                }
            }
        }
        Tree { parents }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents
            .get(node.index())
            .copied()
            .filter(|parent| parent.is_valid())
    }

    /// Parents of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |&node| self.parent(node))
    }

    /// Whether `node` lies inside `ancestor` (or is it).
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|parent| parent == ancestor)
    }
}

#[cfg(test)]
mod tests;
