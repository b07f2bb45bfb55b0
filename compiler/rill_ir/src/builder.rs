//! Programmatic tree construction.
//!
//! Parsers, hosts and tests all build trees through [`AstBuilder`]. Children
//! must be created before their parents, which keeps every child id smaller
//! than its parent's and lets analyses run in plain allocation order.

use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::visitor::child_ids;
use crate::{Ast, Name, NodeId, NodeRange, SharedInterner, Span, Type, Unit};

pub struct AstBuilder {
    nodes: Vec<Node>,
    lists: Vec<NodeId>,
    interner: SharedInterner,
    offset: u32,
}

impl AstBuilder {
    pub fn new(interner: &SharedInterner) -> Self {
        AstBuilder {
            nodes: Vec::new(),
            lists: Vec::new(),
            interner: interner.clone(),
            offset: 0,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Allocate a node with an explicit source span.
    ///
    /// # Panics
    /// Panics if the arena outgrows `u32` indices.
    pub fn alloc_spanned(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&index| index != u32::MAX)
            .unwrap_or_else(|| panic!("syntax tree exceeded {} nodes", u32::MAX - 1));
        self.offset = self.offset.max(span.end);
        self.nodes.push(Node { kind, span });
        NodeId::new(index)
    }

    /// Allocate a node whose span covers its children plus one synthetic
    /// position of its own.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let own = Span::new(self.offset, self.offset + 1);
        let span = child_ids(&kind, &self.lists)
            .into_iter()
            .filter_map(|child| self.nodes.get(child.index()))
            .fold(own, |span, child| span.merge(child.span));
        self.alloc_spanned(kind, span)
    }

    /// Store a child list.
    ///
    /// # Panics
    /// Panics if the list arena outgrows `u32` indices.
    pub fn list(&mut self, ids: &[NodeId]) -> NodeRange {
        let start = u32::try_from(self.lists.len())
            .unwrap_or_else(|_| panic!("child lists exceeded {} entries", u32::MAX));
        let len = u32::try_from(ids.len())
            .unwrap_or_else(|_| panic!("child list exceeded {} entries", u32::MAX));
        self.lists.extend_from_slice(ids);
        NodeRange::new(start, len)
    }

    pub fn number(&mut self, text: &str) -> NodeId {
        self.number_with_unit(text, Unit::unitless())
    }

    pub fn number_with_unit(&mut self, text: &str, unit: Unit) -> NodeId {
        let text = self.name(text);
        self.alloc(NodeKind::Number { text, unit })
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.alloc(NodeKind::Boolean(value))
    }

    pub fn text(&mut self, value: &str) -> NodeId {
        let text = self.name(value);
        self.alloc(NodeKind::Text(text))
    }

    pub fn none(&mut self) -> NodeId {
        self.alloc(NodeKind::None)
    }

    pub fn sequence(&mut self, items: &[NodeId]) -> NodeId {
        let items = self.list(items);
        self.alloc(NodeKind::Sequence { items })
    }

    pub fn set(&mut self, items: &[NodeId]) -> NodeId {
        let items = self.list(items);
        self.alloc(NodeKind::Set { items })
    }

    pub fn mapping(&mut self, pairs: &[(NodeId, NodeId)]) -> NodeId {
        let entries: Vec<NodeId> = pairs
            .iter()
            .map(|&(key, value)| self.alloc(NodeKind::KeyValue { key, value }))
            .collect();
        let entries = self.list(&entries);
        self.alloc(NodeKind::Mapping { entries })
    }

    pub fn reference(&mut self, name: &str) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::Reference { name })
    }

    pub fn property(&mut self, structure: NodeId, name: &str) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::Property { structure, name })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(NodeKind::Unary { op, operand })
    }

    pub fn conditional(&mut self, condition: NodeId, yes: NodeId, no: NodeId) -> NodeId {
        self.alloc(NodeKind::Conditional { condition, yes, no })
    }

    /// `name: value`
    pub fn bind(&mut self, name: &str, value: NodeId) -> NodeId {
        self.bind_full(name, value, None, false)
    }

    /// `name•type: value`
    pub fn bind_typed(&mut self, name: &str, value: NodeId, annotation: Type) -> NodeId {
        self.bind_full(name, value, Some(annotation), false)
    }

    /// A required function or structure input.
    pub fn input(&mut self, name: &str) -> NodeId {
        self.bind_full(name, NodeId::INVALID, None, false)
    }

    pub fn typed_input(&mut self, name: &str, annotation: Type) -> NodeId {
        self.bind_full(name, NodeId::INVALID, Some(annotation), false)
    }

    /// An optional input evaluated from `default` when the caller omits it.
    pub fn optional_input(&mut self, name: &str, default: NodeId) -> NodeId {
        self.bind_full(name, default, None, false)
    }

    /// An input that collects all remaining arguments into a sequence.
    pub fn variadic_input(&mut self, name: &str) -> NodeId {
        self.bind_full(name, NodeId::INVALID, None, true)
    }

    pub fn bind_full(
        &mut self,
        name: &str,
        value: NodeId,
        annotation: Option<Type>,
        variadic: bool,
    ) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::Bind {
            name,
            value,
            annotation,
            variadic,
        })
    }

    /// `ƒ name(inputs) body`; pass `""` for an anonymous function.
    pub fn function(&mut self, name: &str, inputs: &[NodeId], body: NodeId) -> NodeId {
        self.function_full(name, inputs, body, None)
    }

    pub fn function_full(
        &mut self,
        name: &str,
        inputs: &[NodeId],
        body: NodeId,
        output: Option<Type>,
    ) -> NodeId {
        let name = self.name(name);
        let inputs = self.list(inputs);
        self.alloc(NodeKind::Function {
            name,
            inputs,
            body,
            output,
        })
    }

    pub fn structure(&mut self, name: &str, inputs: &[NodeId]) -> NodeId {
        let name = self.name(name);
        let inputs = self.list(inputs);
        self.alloc(NodeKind::Structure { name, inputs })
    }

    pub fn evaluate(&mut self, callee: NodeId, arguments: &[NodeId]) -> NodeId {
        let arguments = self.list(arguments);
        self.alloc(NodeKind::Evaluate { callee, arguments })
    }

    /// `name(arguments)`, calling whatever `name` resolves to.
    pub fn call(&mut self, name: &str, arguments: &[NodeId]) -> NodeId {
        let callee = self.reference(name);
        self.evaluate(callee, arguments)
    }

    pub fn changed(&mut self, stream: NodeId) -> NodeId {
        self.alloc(NodeKind::Changed { stream })
    }

    pub fn borrow(&mut self, source: &str) -> NodeId {
        let source = self.name(source);
        self.alloc(NodeKind::Borrow { source })
    }

    pub fn placeholder(&mut self) -> NodeId {
        self.alloc(NodeKind::Placeholder)
    }

    pub fn unparsable(&mut self, text: &str) -> NodeId {
        let text = self.name(text);
        self.alloc(NodeKind::Unparsable { text })
    }

    pub fn block(&mut self, statements: &[NodeId]) -> NodeId {
        let statements = self.list(statements);
        self.alloc(NodeKind::Block { statements })
    }

    /// Wrap `statements` in a block and a program, and finish the tree.
    pub fn program(mut self, statements: &[NodeId]) -> Ast {
        let body = self.block(statements);
        let root = self.alloc(NodeKind::Program { body });
        self.finish(root)
    }

    /// Finish the tree with an explicitly built root.
    pub fn finish(self, root: NodeId) -> Ast {
        Ast::from_parts(self.nodes, self.lists, root, self.interner)
    }
}

#[cfg(test)]
mod tests;
