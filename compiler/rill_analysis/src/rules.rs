//! Per-node well-formedness rules.
//!
//! Every node kind checks only itself and its direct children; the walk in
//! `analysis` visits every reachable node once. Rules never stop at the
//! first problem, so a partial tree still gets a complete report.

use crate::conflict::{Conflict, ConflictKind};
use crate::context::{Context, Definition, SourceType};
use rill_eval::Number;
use rill_ir::ast::NodeKind;
use rill_ir::{BinaryOp, Name, NodeId, Type, UnaryOp};
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) struct Checker<'c, 'a> {
    ctx: &'c Context<'a>,
    /// `Bind` statements some reference resolves to.
    used: &'c FxHashSet<NodeId>,
    conflicts: Vec<Conflict>,
}

/// Inputs a call site can be checked against.
enum Signature<'a> {
    Inputs(&'a [NodeId]),
    Native(&'a [Name]),
}

impl<'c, 'a> Checker<'c, 'a> {
    pub(crate) fn new(ctx: &'c Context<'a>, used: &'c FxHashSet<NodeId>) -> Self {
        Checker {
            ctx,
            used,
            conflicts: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> Vec<Conflict> {
        self.conflicts
    }

    fn report(&mut self, conflict: Conflict) {
        tracing::trace!(%conflict, "conflict");
        self.conflicts.push(conflict);
    }

    /// Report a missing child once per parent.
    fn require(&mut self, parent: NodeId, children: &[NodeId]) {
        if children.iter().any(|child| !child.is_valid()) {
            self.report(Conflict::new(ConflictKind::MissingValue, parent));
        }
    }

    fn expect_type(&mut self, expected: &Type, node: NodeId, related: NodeId) {
        let found = self.ctx.type_of(node);
        if !expected.accepts(&found) {
            self.report(
                Conflict::new(
                    ConflictKind::IncompatibleType {
                        expected: expected.clone(),
                        found,
                    },
                    node,
                )
                .with_secondary(related),
            );
        }
    }

    pub(crate) fn check(&mut self, node: NodeId) {
        let ast = self.ctx.ast;
        let Some(kind) = ast.kind(node) else {
            return;
        };
        match kind {
            NodeKind::Program { body } => self.require(node, &[*body]),
            NodeKind::Block { statements } => self.block(node, ast.list(*statements)),
            NodeKind::Bind {
                value, annotation, ..
            } => {
                let in_block = self
                    .ctx
                    .tree
                    .parent(node)
                    .and_then(|parent| ast.kind(parent))
                    .is_some_and(|parent| matches!(parent, NodeKind::Block { .. }));
                if in_block {
                    self.require(node, &[*value]);
                }
                if let (Some(annotation), true) = (annotation, value.is_valid()) {
                    self.expect_type(annotation, *value, node);
                }
            }
            NodeKind::Number { text, unit } => {
                if Number::parse(ast.text(*text), unit.clone()).is_none() {
                    self.report(Conflict::new(ConflictKind::NotANumber, node));
                }
            }
            NodeKind::Sequence { items } | NodeKind::Set { items } => {
                self.require(node, ast.list(*items));
            }
            NodeKind::KeyValue { key, value } => self.require(node, &[*key, *value]),
            NodeKind::Reference { name } => {
                if self.ctx.resolve(node, *name).is_none() {
                    self.report(Conflict::new(ConflictKind::UnknownName(*name), node));
                }
            }
            NodeKind::Property { structure, name } => {
                self.require(node, &[*structure]);
                if let Type::Structure(definition) = self.ctx.type_of(*structure) {
                    let has_field = match ast.kind(definition) {
                        Some(NodeKind::Structure { inputs, .. }) => ast
                            .list(*inputs)
                            .iter()
                            .any(|&input| ast.kind(input).and_then(NodeKind::declared_name) == Some(*name)),
                        _ => true,
                    };
                    if !has_field {
                        self.report(
                            Conflict::new(ConflictKind::UnknownProperty(*name), node)
                                .with_secondary(definition),
                        );
                    }
                }
            }
            NodeKind::Binary { op, left, right } => {
                self.require(node, &[*left, *right]);
                if left.is_valid() && right.is_valid() {
                    self.binary(node, *op, *left, *right);
                }
            }
            NodeKind::Unary { op, operand } => {
                self.require(node, &[*operand]);
                if operand.is_valid() {
                    let expected = match op {
                        UnaryOp::Negate => Type::number(),
                        UnaryOp::Not => Type::Boolean,
                    };
                    // Any unit negates.
                    let found = self.ctx.type_of(*operand);
                    if !matches!((op, &found), (UnaryOp::Negate, Type::Number(_))) {
                        self.expect_type(&expected, *operand, node);
                    }
                }
            }
            NodeKind::Conditional { condition, yes, no } => {
                self.require(node, &[*condition, *yes, *no]);
                if condition.is_valid() {
                    self.expect_type(&Type::Boolean, *condition, node);
                }
            }
            NodeKind::Function {
                inputs,
                body,
                output,
                ..
            } => {
                self.inputs(ast.list(*inputs));
                if let (Some(output), true) = (output, body.is_valid()) {
                    self.expect_type(output, *body, node);
                }
            }
            NodeKind::Structure { inputs, .. } => self.inputs(ast.list(*inputs)),
            NodeKind::Evaluate { callee, arguments } => {
                let arguments = ast.list(*arguments);
                self.require(node, &[*callee]);
                self.require(node, arguments);
                if callee.is_valid() {
                    self.call(node, *callee, arguments);
                }
            }
            NodeKind::Changed { stream } => {
                let is_stream = match ast.kind(*stream) {
                    Some(NodeKind::Reference { name }) => {
                        matches!(self.ctx.resolve(*stream, *name), Some(Definition::Stream(_)))
                    }
                    _ => false,
                };
                if !is_stream {
                    self.report(Conflict::new(ConflictKind::ExpectedStream, node).with_secondary(*stream));
                }
            }
            NodeKind::Borrow { source } => {
                let found = self
                    .ctx
                    .lookup
                    .map_or(SourceType::Missing, |lookup| lookup.source_type(*source));
                match found {
                    SourceType::Resolved(_) => {}
                    SourceType::Analyzing => {
                        self.report(Conflict::new(ConflictKind::BorrowCycle(*source), node));
                    }
                    SourceType::Missing => {
                        self.report(Conflict::new(ConflictKind::UnknownSource(*source), node));
                    }
                }
            }
            NodeKind::Placeholder => self.report(Conflict::new(ConflictKind::Placeholder, node)),
            NodeKind::Unparsable { .. } => {
                self.report(Conflict::new(ConflictKind::Unparsable, node));
            }
            NodeKind::Mapping { .. } | NodeKind::Boolean(_) | NodeKind::Text(_) | NodeKind::None => {}
        }
    }

    fn block(&mut self, node: NodeId, statements: &[NodeId]) {
        let ast = self.ctx.ast;
        self.require(node, statements);

        match statements.last() {
            None => self.report(Conflict::new(ConflictKind::ExpectedEndingExpression, node)),
            Some(&last) if matches!(ast.kind(last), Some(NodeKind::Bind { .. })) => self.report(
                Conflict::new(ConflictKind::ExpectedEndingExpression, node).with_secondary(last),
            ),
            Some(_) => {}
        }

        let mut declared: FxHashMap<Name, NodeId> = FxHashMap::default();
        for &statement in statements {
            let Some(name) = ast.kind(statement).and_then(NodeKind::declared_name) else {
                continue;
            };
            if let Some(&earlier) = declared.get(&name) {
                self.report(
                    Conflict::new(ConflictKind::DuplicateName(name), statement).with_secondary(earlier),
                );
            } else {
                declared.insert(name, statement);
            }
        }

        // Top-level binds are the program's named results, worth keeping
        // even when nothing refers to them.
        let top_level = self
            .ctx
            .tree
            .parent(node)
            .is_some_and(|parent| matches!(ast.kind(parent), Some(NodeKind::Program { .. })));
        if top_level {
            return;
        }
        let (_, leading) = match statements.split_last() {
            Some(split) => split,
            None => return,
        };
        for &statement in leading {
            if let Some(NodeKind::Bind { name, .. }) = ast.kind(statement) {
                if !self.used.contains(&statement) {
                    self.report(Conflict::new(ConflictKind::UnusedBind(*name), statement));
                }
            }
        }
    }

    fn inputs(&mut self, inputs: &[NodeId]) {
        let ast = self.ctx.ast;
        let mut seen: FxHashMap<Name, NodeId> = FxHashMap::default();
        let mut optional = None;
        for (position, &input) in inputs.iter().enumerate() {
            let Some(NodeKind::Bind {
                name,
                value,
                variadic,
                ..
            }) = ast.kind(input)
            else {
                self.report(Conflict::new(ConflictKind::MissingValue, input));
                continue;
            };

            if let Some(&earlier) = seen.get(name) {
                self.report(
                    Conflict::new(ConflictKind::DuplicateInput(*name), input).with_secondary(earlier),
                );
            } else {
                seen.insert(*name, input);
            }

            if *variadic && position + 1 != inputs.len() {
                self.report(Conflict::new(ConflictKind::VariadicNotLast, input));
            }

            if value.is_valid() {
                optional = Some(input);
            } else if let (false, Some(optional)) = (*variadic, optional) {
                self.report(
                    Conflict::new(ConflictKind::RequiredAfterOptional, input).with_secondary(optional),
                );
            }
        }
    }

    fn binary(&mut self, node: NodeId, op: BinaryOp, left: NodeId, right: NodeId) {
        let lt = self.ctx.type_of(left);
        let rt = self.ctx.type_of(right);

        if op.is_logical() {
            self.expect_type(&Type::Boolean, left, node);
            self.expect_type(&Type::Boolean, right, node);
            return;
        }
        if matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) || lt.is_any() || rt.is_any() {
            return;
        }

        let accepts_left = |ty: &Type| match op {
            BinaryOp::Add => matches!(ty, Type::Number(_) | Type::Text | Type::Sequence(_)),
            _ if op.is_comparison() => matches!(ty, Type::Number(_) | Type::Text),
            _ => matches!(ty, Type::Number(_)),
        };

        match (&lt, &rt) {
            (Type::Number(a), Type::Number(b)) => {
                let same_unit_required = !matches!(op, BinaryOp::Multiply | BinaryOp::Divide);
                if same_unit_required && a != b {
                    self.report(Conflict::new(ConflictKind::IncompatibleUnits, node).with_secondary(right));
                }
            }
            (Type::Text, Type::Text) if accepts_left(&lt) => {}
            (Type::Sequence(_), Type::Sequence(_)) if accepts_left(&lt) => {}
            _ => {
                let culprit = if accepts_left(&lt) { right } else { left };
                self.report(
                    Conflict::new(ConflictKind::IncompatibleOperand(op), culprit).with_secondary(node),
                );
            }
        }
    }

    /// The inputs of whatever `callee` statically calls.
    fn signature(&self, callee: NodeId) -> Option<Signature<'a>> {
        let ast = self.ctx.ast;
        let definition = match ast.kind(callee)? {
            NodeKind::Function { .. } | NodeKind::Structure { .. } => callee,
            NodeKind::Reference { name } => match self.ctx.resolve(callee, *name)? {
                Definition::Native(id) => {
                    let native = self.ctx.natives.get(id)?;
                    return Some(Signature::Native(&native.inputs));
                }
                definition => self.ctx.callable(definition)?,
            },
            _ => return None,
        };
        match ast.kind(definition)? {
            NodeKind::Function { inputs, .. } | NodeKind::Structure { inputs, .. } => {
                Some(Signature::Inputs(ast.list(*inputs)))
            }
            _ => None,
        }
    }

    fn call(&mut self, node: NodeId, callee: NodeId, arguments: &[NodeId]) {
        let ast = self.ctx.ast;
        let callee_type = self.ctx.type_of(callee);
        let Type::Function { inputs: types, .. } = &callee_type else {
            if !callee_type.is_any() {
                self.report(Conflict::new(ConflictKind::NotAFunction, callee).with_secondary(node));
            }
            return;
        };

        // Arguments past a variadic input are its elements.
        let mut typed = arguments.len();
        match self.signature(callee) {
            Some(Signature::Inputs(inputs)) => {
                let variadic = inputs.iter().position(|&input| {
                    matches!(ast.kind(input), Some(NodeKind::Bind { variadic: true, .. }))
                });
                let fixed = variadic.unwrap_or(inputs.len());
                let missing = inputs[..fixed].iter().skip(arguments.len()).find(|&&input| {
                    matches!(ast.kind(input), Some(NodeKind::Bind { value, .. }) if !value.is_valid())
                });
                if let Some(&input) = missing {
                    let name = ast.kind(input).and_then(NodeKind::declared_name).unwrap_or(Name::EMPTY);
                    self.report(
                        Conflict::new(ConflictKind::MissingInput(name), node).with_secondary(input),
                    );
                }
                if variadic.is_none() && arguments.len() > inputs.len() {
                    self.report(
                        Conflict::new(ConflictKind::UnexpectedInput, arguments[inputs.len()])
                            .with_secondary(node),
                    );
                }
                typed = typed.min(fixed);
            }
            Some(Signature::Native(inputs)) => {
                if let Some(&name) = inputs.get(arguments.len()) {
                    self.report(Conflict::new(ConflictKind::MissingInput(name), node));
                }
                if let Some(&extra) = arguments.get(inputs.len()) {
                    self.report(Conflict::new(ConflictKind::UnexpectedInput, extra).with_secondary(node));
                }
            }
            None => {}
        }

        for (&argument, expected) in arguments[..typed].iter().zip(types) {
            if argument.is_valid() {
                self.expect_type(expected, argument, node);
            }
        }
    }
}
