//! Tree traversal.
//!
//! All walks are iterative so arbitrarily deep trees cannot exhaust the
//! native stack.

use crate::ast::NodeKind;
use crate::{Ast, NodeId, NodeRange};
use smallvec::SmallVec;

/// Child ids of a node, in evaluation order, skipping `INVALID` holes.
pub type Children = SmallVec<[NodeId; 4]>;

pub(crate) fn child_ids(kind: &NodeKind, lists: &[NodeId]) -> Children {
    let list = |range: NodeRange| -> &[NodeId] {
        let start = range.start as usize;
        lists.get(start..start + range.len()).unwrap_or(&[])
    };

    let mut children = Children::new();
    match kind {
        NodeKind::Program { body } => children.push(*body),
        NodeKind::Block { statements } => children.extend_from_slice(list(*statements)),
        NodeKind::Bind { value, .. } => children.push(*value),
        NodeKind::Sequence { items } | NodeKind::Set { items } => {
            children.extend_from_slice(list(*items));
        }
        NodeKind::Mapping { entries } => children.extend_from_slice(list(*entries)),
        NodeKind::KeyValue { key, value } => children.extend([*key, *value]),
        NodeKind::Property { structure, .. } => children.push(*structure),
        NodeKind::Binary { left, right, .. } => children.extend([*left, *right]),
        NodeKind::Unary { operand, .. } => children.push(*operand),
        NodeKind::Conditional { condition, yes, no } => children.extend([*condition, *yes, *no]),
        NodeKind::Function { inputs, body, .. } => {
            children.extend_from_slice(list(*inputs));
            children.push(*body);
        }
        NodeKind::Structure { inputs, .. } => children.extend_from_slice(list(*inputs)),
        NodeKind::Evaluate { callee, arguments } => {
            children.push(*callee);
            children.extend_from_slice(list(*arguments));
        }
        NodeKind::Changed { stream } => children.push(*stream),
        NodeKind::Number { .. }
        | NodeKind::Boolean(_)
        | NodeKind::Text(_)
        | NodeKind::None
        | NodeKind::Reference { .. }
        | NodeKind::Borrow { .. }
        | NodeKind::Placeholder
        | NodeKind::Unparsable { .. } => {}
    }
    children.retain(|id| id.is_valid());
    children
}

impl Ast {
    pub fn children(&self, id: NodeId) -> Children {
        match self.kind(id) {
            Some(kind) => child_ids(kind, self.lists()),
            None => Children::new(),
        }
    }

    /// `from` and everything below it, parents before children.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if self.kind(from).is_none() {
            return order;
        }
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// `from` and everything below it, children before parents.
    pub fn post_order(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if self.kind(from).is_none() {
            return order;
        }
        let mut stack = vec![(from, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for child in self.children(id).into_iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }
}
