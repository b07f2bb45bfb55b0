//! Compilation of syntax nodes into step sequences.
//!
//! Each node compiles exactly once; the result is cached by `NodeId` for the
//! lifetime of the tree. Composite nodes splice their children's sequences
//! together with control steps. The cache belongs to one tree and is dropped
//! with it, never patched.

use crate::step::Step;
use rill_ir::ast::NodeKind;
use rill_ir::{ensure_sufficient_stack, Ast, BinaryOp, NodeId};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Immutable, shareable step sequence.
pub type Steps = Arc<[Step]>;

#[derive(Default)]
pub struct StepCache {
    sequences: FxHashMap<NodeId, Steps>,
    entries: FxHashMap<NodeId, Steps>,
}

impl StepCache {
    pub fn new() -> Self {
        StepCache::default()
    }

    /// Number of nodes compiled so far.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// The step sequence of `node`, compiling it on first request.
    pub fn compile(&mut self, ast: &Ast, node: NodeId) -> Steps {
        if let Some(steps) = self.sequences.get(&node) {
            return Arc::clone(steps);
        }
        let steps: Steps = ensure_sufficient_stack(|| self.build(ast, node)).into();
        self.sequences.insert(node, Arc::clone(&steps));
        steps
    }

    /// The sequence a frame runs when `definition` is called: defaults for
    /// omitted inputs, then the function body or the structure instantiation.
    pub fn entry(&mut self, ast: &Ast, definition: NodeId) -> Steps {
        if let Some(steps) = self.entries.get(&definition) {
            return Arc::clone(steps);
        }

        let mut steps = Vec::new();
        match ast.kind(definition) {
            Some(NodeKind::Function { inputs, body, .. }) => {
                self.defaults(ast, ast.list(*inputs), &mut steps);
                if body.is_valid() {
                    steps.extend_from_slice(&self.compile(ast, *body));
                } else {
                    steps.push(Step::Expected(definition));
                }
            }
            Some(NodeKind::Structure { inputs, .. }) => {
                self.defaults(ast, ast.list(*inputs), &mut steps);
                steps.push(Step::Instantiate(definition));
            }
            _ => steps.push(Step::Expected(definition)),
        }

        let steps: Steps = steps.into();
        self.entries.insert(definition, Arc::clone(&steps));
        steps
    }

    fn defaults(&mut self, ast: &Ast, inputs: &[NodeId], steps: &mut Vec<Step>) {
        for &input in inputs {
            let Some(NodeKind::Bind { value, .. }) = ast.kind(input) else {
                continue;
            };
            if !value.is_valid() {
                continue;
            }
            let default = self.compile(ast, *value);
            steps.push(Step::SkipIfBound {
                input,
                distance: distance(default.len() + 1),
            });
            steps.extend_from_slice(&default);
            steps.push(Step::Bind(input));
        }
    }

    /// Steps for a child that may be a hole in a partial tree.
    fn child(&mut self, ast: &Ast, parent: NodeId, child: NodeId, steps: &mut Vec<Step>) {
        if ast.kind(child).is_some() {
            steps.extend_from_slice(&self.compile(ast, child));
        } else {
            steps.push(Step::Expected(parent));
        }
    }

    fn build(&mut self, ast: &Ast, node: NodeId) -> Vec<Step> {
        let Some(kind) = ast.kind(node) else {
            return vec![Step::Expected(node)];
        };

        let mut steps = Vec::new();
        match kind {
            NodeKind::Program { body } => {
                self.child(ast, node, *body, &mut steps);
                steps.push(Step::Finish(node));
            }
            NodeKind::Block { statements } => {
                let statements = ast.list(*statements);
                if declares_names(ast, statements) {
                    steps.push(Step::Enter(node));
                }
                for &statement in statements {
                    self.child(ast, node, statement, &mut steps);
                }
                steps.push(Step::Finish(node));
            }
            NodeKind::Bind { value, .. } => {
                self.child(ast, node, *value, &mut steps);
                steps.push(Step::Bind(node));
            }
            NodeKind::Sequence { items } | NodeKind::Set { items } => {
                for &item in ast.list(*items) {
                    self.child(ast, node, item, &mut steps);
                }
                steps.push(Step::Finish(node));
            }
            NodeKind::Mapping { entries } => {
                for &entry in ast.list(*entries) {
                    self.child(ast, node, entry, &mut steps);
                }
                steps.push(Step::Finish(node));
            }
            // Entries leave key and value on the stack for their mapping.
            NodeKind::KeyValue { key, value } => {
                self.child(ast, node, *key, &mut steps);
                self.child(ast, node, *value, &mut steps);
            }
            NodeKind::Property { structure, .. } => {
                self.child(ast, node, *structure, &mut steps);
                steps.push(Step::Finish(node));
            }
            NodeKind::Binary { op, left, right } if op.is_logical() => {
                self.child(ast, node, *left, &mut steps);
                let mut rest = Vec::new();
                self.child(ast, node, *right, &mut rest);
                steps.push(Step::Branch {
                    node,
                    when: *op == BinaryOp::Or,
                    distance: distance(rest.len() + 1),
                });
                steps.extend(rest);
                steps.push(Step::Finish(node));
            }
            NodeKind::Binary { left, right, .. } => {
                self.child(ast, node, *left, &mut steps);
                self.child(ast, node, *right, &mut steps);
                steps.push(Step::Finish(node));
            }
            NodeKind::Unary { operand, .. } => {
                self.child(ast, node, *operand, &mut steps);
                steps.push(Step::Finish(node));
            }
            NodeKind::Conditional { condition, yes, no } => {
                let mut yes_steps = Vec::new();
                self.child(ast, node, *yes, &mut yes_steps);
                let mut no_steps = Vec::new();
                self.child(ast, node, *no, &mut no_steps);

                self.child(ast, node, *condition, &mut steps);
                steps.push(Step::JumpUnless {
                    node,
                    distance: distance(yes_steps.len() + 1),
                });
                steps.extend(yes_steps);
                steps.push(Step::Jump(distance(no_steps.len())));
                steps.extend(no_steps);
                steps.push(Step::Finish(node));
            }
            NodeKind::Evaluate { callee, arguments } => {
                self.child(ast, node, *callee, &mut steps);
                let arguments = ast.list(*arguments);
                for &argument in arguments {
                    self.child(ast, node, argument, &mut steps);
                }
                steps.push(Step::Call {
                    node,
                    arity: u32::try_from(arguments.len()).unwrap_or(u32::MAX),
                });
                steps.push(Step::Finish(node));
            }
            // Definitions only create a closure here; their bodies run in
            // the callee's frame (see `entry`). `Changed` reads the trigger
            // name, not the stream's value.
            NodeKind::Function { .. }
            | NodeKind::Structure { .. }
            | NodeKind::Changed { .. }
            | NodeKind::Number { .. }
            | NodeKind::Boolean(_)
            | NodeKind::Text(_)
            | NodeKind::None
            | NodeKind::Reference { .. }
            | NodeKind::Borrow { .. }
            | NodeKind::Placeholder
            | NodeKind::Unparsable { .. } => steps.push(Step::Finish(node)),
        }
        steps
    }
}

fn declares_names(ast: &Ast, statements: &[NodeId]) -> bool {
    statements
        .iter()
        .filter_map(|&statement| ast.kind(statement))
        .any(|kind| kind.declared_name().is_some())
}

/// Step sequences are far shorter than `i32::MAX`; saturate rather than wrap.
fn distance(steps: usize) -> i32 {
    i32::try_from(steps).unwrap_or(i32::MAX)
}
