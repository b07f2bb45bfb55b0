//! Name resolution context.
//!
//! A [`Context`] bundles what analysis of one tree needs to know: the tree
//! and its parent links, the natives and streams visible at the root, and
//! how to ask about other sources. It also owns the memoized node types
//! (see `typing`).

use crate::tree::Tree;
use rill_eval::{NativeId, NativeRegistry, StreamSignature};
use rill_ir::ast::NodeKind;
use rill_ir::{Ast, Name, NodeId, Type};
use std::cell::RefCell;

/// What a name refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Definition {
    /// A `Bind` statement of a block.
    Bind(NodeId),
    /// An input of the function or structure `definition`.
    Input { input: NodeId, definition: NodeId },
    Function(NodeId),
    Structure(NodeId),
    /// A `Borrow` statement, bound under its source's name.
    Borrow(NodeId),
    /// Index into the stream signatures.
    Stream(usize),
    Native(NativeId),
}

impl Definition {
    /// The node that declares the name, if it is in this tree.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Definition::Bind(node)
            | Definition::Input { input: node, .. }
            | Definition::Function(node)
            | Definition::Structure(node)
            | Definition::Borrow(node) => Some(node),
            Definition::Stream(_) | Definition::Native(_) => None,
        }
    }
}

/// The answer to "what does source S evaluate to".
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum SourceType {
    Resolved(Type),
    /// The source is being analyzed further up the stack.
    Analyzing,
    Missing,
}

/// Access to other sources of a project, for `Borrow`.
pub trait SourceLookup {
    fn source_type(&self, source: Name) -> SourceType;
}

/// Memo slot for one node's type.
#[derive(Clone)]
pub(crate) enum Slot {
    Unknown,
    InProgress,
    Known(Type),
}

pub struct Context<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) tree: Tree,
    pub(crate) natives: &'a NativeRegistry,
    pub(crate) streams: &'a [StreamSignature],
    pub(crate) lookup: Option<&'a dyn SourceLookup>,
    /// Indexed by `NodeId`.
    pub(crate) types: RefCell<Vec<Slot>>,
}

impl<'a> Context<'a> {
    pub fn new(
        ast: &'a Ast,
        natives: &'a NativeRegistry,
        streams: &'a [StreamSignature],
        lookup: Option<&'a dyn SourceLookup>,
    ) -> Self {
        Context {
            ast,
            tree: Tree::new(ast),
            natives,
            streams,
            lookup,
            types: RefCell::new(vec![Slot::Unknown; ast.len()]),
        }
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn stream(&self, index: usize) -> Option<&StreamSignature> {
        self.streams.get(index)
    }

    /// Resolve `name` as seen from `at`.
    ///
    /// Walking outward: earlier statements of each enclosing block (and the
    /// statement containing `at` when it defines a function or structure,
    /// or binds a function, so definitions can recurse), then the inputs and
    /// name of each enclosing definition, then streams, then natives.
    pub fn resolve(&self, at: NodeId, name: Name) -> Option<Definition> {
        let mut child = at;
        for parent in self.tree.ancestors(at) {
            match self.ast.kind(parent) {
                Some(NodeKind::Block { statements }) => {
                    let statements = self.ast.list(*statements);
                    if let Some(found) = self.in_block(statements, child, name) {
                        return Some(found);
                    }
                }
                Some(NodeKind::Function {
                    name: own, inputs, ..
                })
                | Some(NodeKind::Structure {
                    name: own, inputs, ..
                }) => {
                    let inputs = self.ast.list(*inputs);
                    let input = inputs
                        .iter()
                        .copied()
                        .filter(|&input| input != child)
                        .find(|&input| self.declares(input, name));
                    if let Some(input) = input {
                        return Some(Definition::Input {
                            input,
                            definition: parent,
                        });
                    }
                    if *own == name {
                        return Some(self.definition_of(parent));
                    }
                }
                _ => {}
            }
            child = parent;
        }

        if let Some(index) = self.streams.iter().rposition(|stream| stream.name == name) {
            return Some(Definition::Stream(index));
        }
        self.natives.lookup(name).map(Definition::Native)
    }

    fn in_block(&self, statements: &[NodeId], child: NodeId, name: Name) -> Option<Definition> {
        let position = statements.iter().position(|&statement| statement == child)?;
        let containing = statements[position];
        if self.declares(containing, name) && self.may_recurse(containing) {
            return Some(self.definition_of(containing));
        }
        statements[..position]
            .iter()
            .rev()
            .find(|&&statement| self.declares(statement, name))
            .map(|&statement| self.definition_of(statement))
    }

    fn declares(&self, node: NodeId, name: Name) -> bool {
        self.ast
            .kind(node)
            .and_then(NodeKind::declared_name)
            .is_some_and(|declared| declared == name)
    }

    /// Whether a statement's own name is visible inside it.
    fn may_recurse(&self, statement: NodeId) -> bool {
        match self.ast.kind(statement) {
            Some(NodeKind::Function { .. } | NodeKind::Structure { .. }) => true,
            Some(NodeKind::Bind { value, .. }) => {
                matches!(self.ast.kind(*value), Some(NodeKind::Function { .. }))
            }
            _ => false,
        }
    }

    fn definition_of(&self, node: NodeId) -> Definition {
        match self.ast.kind(node) {
            Some(NodeKind::Function { .. }) => Definition::Function(node),
            Some(NodeKind::Structure { .. }) => Definition::Structure(node),
            Some(NodeKind::Borrow { .. }) => Definition::Borrow(node),
            _ => Definition::Bind(node),
        }
    }

    /// The function or structure node a definition calls, looking through
    /// binds of function literals.
    pub fn callable(&self, definition: Definition) -> Option<NodeId> {
        match definition {
            Definition::Function(node) | Definition::Structure(node) => Some(node),
            Definition::Bind(node) => match self.ast.kind(node) {
                Some(NodeKind::Bind { value, .. }) => match self.ast.kind(*value) {
                    Some(NodeKind::Function { .. } | NodeKind::Structure { .. }) => Some(*value),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
