//! Static call and dependency graphs.
//!
//! Both graphs are built from resolutions alone; nothing is evaluated. An
//! edge `a -> b` in the dependency graph means the value of `a` may change
//! when the value of `b` does. A function node depends on its body, so a
//! closure carries what its body reads wherever the closure flows.

use crate::context::{Context, Definition};
use rill_eval::NativeId;
use rill_ir::ast::NodeKind;
use rill_ir::{Name, NodeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// What a call site statically invokes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallTarget {
    /// A function or structure node.
    Definition(NodeId),
    Native(NativeId),
}

/// One `Evaluate` node calling a target.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CallSite {
    pub node: NodeId,
    /// The target was passed as an argument to a higher-order native and is
    /// invoked by it, rather than named as the callee.
    pub indirect: bool,
}

pub type Dependencies = SmallVec<[NodeId; 4]>;

pub(crate) struct Graphs {
    pub(crate) resolutions: FxHashMap<NodeId, Definition>,
    pub(crate) calls: FxHashMap<CallTarget, Vec<CallSite>>,
    pub(crate) dependencies: FxHashMap<NodeId, Dependencies>,
    pub(crate) dependents: FxHashMap<NodeId, Vec<NodeId>>,
    pub(crate) stream_references: FxHashMap<Name, Vec<NodeId>>,
    pub(crate) changed: Vec<NodeId>,
}

impl Graphs {
    pub(crate) fn build(ctx: &Context<'_>, reachable: &[NodeId]) -> Self {
        let mut graphs = Graphs {
            resolutions: FxHashMap::default(),
            calls: FxHashMap::default(),
            dependencies: FxHashMap::default(),
            dependents: FxHashMap::default(),
            stream_references: FxHashMap::default(),
            changed: Vec::new(),
        };

        for &node in reachable {
            match ctx.ast.kind(node) {
                Some(NodeKind::Reference { name }) => {
                    if let Some(definition) = ctx.resolve(node, *name) {
                        if let Definition::Stream(index) = definition {
                            if let Some(stream) = ctx.stream(index) {
                                graphs.stream_references.entry(stream.name).or_default().push(node);
                            }
                        }
                        graphs.resolutions.insert(node, definition);
                    }
                }
                Some(NodeKind::Changed { .. }) => graphs.changed.push(node),
                _ => {}
            }
        }

        for &node in reachable {
            if let Some(NodeKind::Evaluate { callee, arguments }) = ctx.ast.kind(node) {
                graphs.record_call(ctx, node, *callee, ctx.ast.list(*arguments));
            }
        }

        for &node in reachable {
            let dependencies = graphs.dependencies_of(ctx, node);
            for &dependency in &dependencies {
                graphs.dependents.entry(dependency).or_default().push(node);
            }
            graphs.dependencies.insert(node, dependencies);
        }
        graphs
    }

    /// The statically known target of a callee expression.
    fn target(&self, ctx: &Context<'_>, callee: NodeId) -> Option<CallTarget> {
        match ctx.ast.kind(callee)? {
            NodeKind::Function { .. } | NodeKind::Structure { .. } => {
                Some(CallTarget::Definition(callee))
            }
            NodeKind::Reference { .. } => match *self.resolutions.get(&callee)? {
                Definition::Native(id) => Some(CallTarget::Native(id)),
                definition => ctx.callable(definition).map(CallTarget::Definition),
            },
            _ => None,
        }
    }

    fn record_call(&mut self, ctx: &Context<'_>, node: NodeId, callee: NodeId, arguments: &[NodeId]) {
        let Some(target) = self.target(ctx, callee) else {
            return;
        };
        self.calls.entry(target).or_default().push(CallSite {
            node,
            indirect: false,
        });

        if let CallTarget::Native(id) = target {
            if ctx.natives.is_higher_order(id) {
                for &argument in arguments {
                    if let Some(definition @ CallTarget::Definition(_)) = self.target(ctx, argument) {
                        self.calls.entry(definition).or_default().push(CallSite {
                            node,
                            indirect: true,
                        });
                    }
                }
            }
        }
    }

    /// What a call of `target` yields besides its arguments: a function's
    /// body, or a structure's definition with its input defaults.
    fn body_of(ctx: &Context<'_>, target: CallTarget) -> Option<NodeId> {
        match target {
            CallTarget::Definition(definition) => match ctx.ast.kind(definition)? {
                NodeKind::Function { body, .. } if body.is_valid() => Some(*body),
                NodeKind::Structure { .. } => Some(definition),
                _ => None,
            },
            CallTarget::Native(_) => None,
        }
    }

    fn dependencies_of(&self, ctx: &Context<'_>, node: NodeId) -> Dependencies {
        let ast = ctx.ast;
        let mut found = Dependencies::new();
        let Some(kind) = ast.kind(node) else {
            return found;
        };
        match kind {
            NodeKind::Program { body } => found.push(*body),
            NodeKind::Block { statements } => found.extend(ast.list(*statements).last().copied()),
            NodeKind::Bind { value, .. } => found.push(*value),
            NodeKind::Sequence { .. }
            | NodeKind::Set { .. }
            | NodeKind::Mapping { .. }
            | NodeKind::KeyValue { .. }
            | NodeKind::Property { .. }
            | NodeKind::Binary { .. }
            | NodeKind::Unary { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Changed { .. } => found.extend(ast.children(node)),
            NodeKind::Reference { .. } => match self.resolutions.get(&node) {
                Some(&Definition::Input { input, definition }) => {
                    self.input_dependencies(ctx, input, definition, &mut found);
                }
                Some(definition) => found.extend(definition.node()),
                None => {}
            },
            NodeKind::Evaluate { callee, arguments } => {
                found.extend(ast.children(node));
                if let Some(body) = self.target(ctx, *callee).and_then(|target| Self::body_of(ctx, target)) {
                    found.push(body);
                }
                if let Some(CallTarget::Native(id)) = self.target(ctx, *callee) {
                    if ctx.natives.is_higher_order(id) {
                        for &argument in ast.list(*arguments) {
                            if let Some(body) = self
                                .target(ctx, argument)
                                .and_then(|target| Self::body_of(ctx, target))
                            {
                                found.push(body);
                            }
                        }
                    }
                }
            }
            NodeKind::Function { body, .. } => found.push(*body),
            NodeKind::Structure { inputs, .. } => {
                for &input in ast.list(*inputs) {
                    if let Some(NodeKind::Bind { value, .. }) = ast.kind(input) {
                        found.push(*value);
                    }
                }
            }
            NodeKind::Number { .. }
            | NodeKind::Boolean(_)
            | NodeKind::Text(_)
            | NodeKind::None
            | NodeKind::Borrow { .. }
            | NodeKind::Placeholder
            | NodeKind::Unparsable { .. } => {}
        }
        found.retain(|dependency| dependency.is_valid());
        found.sort_unstable();
        found.dedup();
        found
    }

    /// An input's value comes from its default or from whatever each call
    /// site passes in its position.
    fn input_dependencies(&self, ctx: &Context<'_>, input: NodeId, definition: NodeId, found: &mut Dependencies) {
        let ast = ctx.ast;
        let (position, variadic, default) = match ast.kind(definition) {
            Some(NodeKind::Function { inputs, .. } | NodeKind::Structure { inputs, .. }) => {
                let Some(position) = ast.list(*inputs).iter().position(|&i| i == input) else {
                    return;
                };
                match ast.kind(input) {
                    Some(NodeKind::Bind {
                        value, variadic, ..
                    }) => (position, *variadic, *value),
                    _ => return,
                }
            }
            _ => return,
        };
        found.push(default);

        let sites = self
            .calls
            .get(&CallTarget::Definition(definition))
            .map_or(&[][..], Vec::as_slice);
        for site in sites {
            let Some(NodeKind::Evaluate { arguments, .. }) = ast.kind(site.node) else {
                continue;
            };
            let arguments = ast.list(*arguments);
            if site.indirect {
                // The native decides what it passes; any argument may flow in.
                found.extend_from_slice(arguments);
            } else if variadic {
                found.extend_from_slice(arguments.get(position..).unwrap_or(&[]));
            } else {
                found.extend(arguments.get(position).copied());
            }
        }
    }
}
