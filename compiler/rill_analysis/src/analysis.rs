//! Whole-tree analysis and its queries.

use crate::conflict::Conflict;
use crate::context::{Context, Definition, SourceLookup};
use crate::dependencies::{CallSite, CallTarget, Dependencies, Graphs};
use crate::rules::Checker;
use rill_eval::{NativeRegistry, StreamSignature};
use rill_ir::{Ast, Name, NodeId, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Indices into `Analysis::conflicts`.
type ConflictIndex = SmallVec<[usize; 2]>;

/// Analyzes one tree against a set of natives and streams.
pub struct Analyzer<'a> {
    ast: &'a Ast,
    natives: &'a NativeRegistry,
    streams: &'a [StreamSignature],
    lookup: Option<&'a dyn SourceLookup>,
}

impl<'a> Analyzer<'a> {
    pub fn new(ast: &'a Ast, natives: &'a NativeRegistry, streams: &'a [StreamSignature]) -> Self {
        Analyzer {
            ast,
            natives,
            streams,
            lookup: None,
        }
    }

    /// Resolve `Borrow` nodes through `lookup`.
    #[must_use]
    pub fn with_lookup(mut self, lookup: &'a dyn SourceLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    #[tracing::instrument(level = "debug", skip_all, fields(nodes = self.ast.len()))]
    pub fn analyze(&self) -> Analysis {
        let ctx = Context::new(self.ast, self.natives, self.streams, self.lookup);
        let reachable = self.ast.descendants(self.ast.root());

        let graphs = Graphs::build(&ctx, &reachable);
        let used: FxHashSet<NodeId> = graphs
            .resolutions
            .values()
            .filter_map(|definition| match definition {
                Definition::Bind(node) => Some(*node),
                _ => None,
            })
            .collect();

        let mut checker = Checker::new(&ctx, &used);
        for &node in &reachable {
            checker.check(node);
        }
        let conflicts = checker.finish();

        let mut types = vec![Type::Any; self.ast.len()];
        for &node in &reachable {
            if let Some(slot) = types.get_mut(node.index()) {
                *slot = ctx.type_of(node);
            }
        }

        let analysis = Analysis::assemble(conflicts, graphs, types);
        tracing::debug!(
            conflicts = analysis.conflicts.len(),
            blocked = analysis.is_blocked(),
            "analysis finished"
        );
        analysis
    }
}

/// Everything known statically about one tree.
///
/// Owned and immutable; it describes exactly one `Ast` and is discarded
/// with it.
#[derive(Debug, Default)]
pub struct Analysis {
    conflicts: Vec<Conflict>,
    primary: FxHashMap<NodeId, ConflictIndex>,
    secondary: FxHashMap<NodeId, ConflictIndex>,
    resolutions: FxHashMap<NodeId, Definition>,
    calls: FxHashMap<CallTarget, Vec<CallSite>>,
    dependencies: FxHashMap<NodeId, Dependencies>,
    dependents: FxHashMap<NodeId, Vec<NodeId>>,
    stream_references: FxHashMap<Name, Vec<NodeId>>,
    changed: Vec<NodeId>,
    types: Vec<Type>,
}

impl Analysis {
    /// An analysis that knows nothing, returned while a tree is still being
    /// analyzed.
    pub fn empty() -> Self {
        Analysis::default()
    }

    fn assemble(conflicts: Vec<Conflict>, graphs: Graphs, types: Vec<Type>) -> Self {
        let mut primary: FxHashMap<NodeId, ConflictIndex> = FxHashMap::default();
        let mut secondary: FxHashMap<NodeId, ConflictIndex> = FxHashMap::default();
        for (index, conflict) in conflicts.iter().enumerate() {
            primary.entry(conflict.primary).or_default().push(index);
            if let Some(node) = conflict.secondary {
                secondary.entry(node).or_default().push(index);
            }
        }
        Analysis {
            conflicts,
            primary,
            secondary,
            resolutions: graphs.resolutions,
            calls: graphs.calls,
            dependencies: graphs.dependencies,
            dependents: graphs.dependents,
            stream_references: graphs.stream_references,
            changed: graphs.changed,
            types,
        }
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    fn indexed<'s>(
        &'s self,
        index: &'s FxHashMap<NodeId, ConflictIndex>,
        node: NodeId,
    ) -> impl Iterator<Item = &'s Conflict> + 's {
        index
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.conflicts.get(i))
    }

    /// Conflicts whose primary node is `node`.
    pub fn primary(&self, node: NodeId) -> impl Iterator<Item = &Conflict> + '_ {
        self.indexed(&self.primary, node)
    }

    /// Conflicts that name `node` as their related node.
    pub fn secondary(&self, node: NodeId) -> impl Iterator<Item = &Conflict> + '_ {
        self.indexed(&self.secondary, node)
    }

    /// Conflicts attached to `node` in either role.
    pub fn touching(&self, node: NodeId) -> impl Iterator<Item = &Conflict> + '_ {
        self.primary(node).chain(self.secondary(node))
    }

    /// Whether any conflict should stop the host from evaluating.
    pub fn is_blocked(&self) -> bool {
        self.conflicts.iter().any(Conflict::is_blocking)
    }

    pub fn resolution(&self, reference: NodeId) -> Option<Definition> {
        self.resolutions.get(&reference).copied()
    }

    pub fn call_sites(&self, target: CallTarget) -> &[CallSite] {
        self.calls.get(&target).map_or(&[], Vec::as_slice)
    }

    /// Nodes whose values `node` reads directly.
    pub fn dependencies(&self, node: NodeId) -> &[NodeId] {
        self.dependencies.get(&node).map_or(&[], |found| found.as_slice())
    }

    /// Nodes that read the value of `node` directly.
    pub fn dependents(&self, node: NodeId) -> &[NodeId] {
        self.dependents.get(&node).map_or(&[], Vec::as_slice)
    }

    pub fn stream_references(&self, stream: Name) -> &[NodeId] {
        self.stream_references.get(&stream).map_or(&[], Vec::as_slice)
    }

    /// Every node whose value may change when `stream` changes: references
    /// to the stream, every `changed` check, and everything transitively
    /// depending on those.
    pub fn affected_by_stream(&self, stream: Name) -> FxHashSet<NodeId> {
        let mut affected = FxHashSet::default();
        let mut queue: VecDeque<NodeId> = self
            .stream_references(stream)
            .iter()
            .chain(&self.changed)
            .copied()
            .collect();
        while let Some(node) = queue.pop_front() {
            if affected.insert(node) {
                queue.extend(self.dependents(node).iter().copied());
            }
        }
        affected
    }

    /// Static type of `node`, `Any` when unknown.
    pub fn type_of(&self, node: NodeId) -> Type {
        self.types.get(node.index()).cloned().unwrap_or(Type::Any)
    }
}

#[cfg(test)]
mod tests;
