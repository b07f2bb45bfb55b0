//! Rill Analysis - static checks over a syntax tree
//!
//! Analysis never evaluates anything. For one [`rill_ir::Ast`] it produces:
//! - Every [`Conflict`], indexed by the nodes it is attached to
//! - A static [`Type`](rill_ir::Type) for every reachable node
//! - The call graph, including calls made on a function's behalf by
//!   higher-order natives
//! - The dependency graph used to decide what a stream change affects
//!
//! Analysis is total: a broken node contributes a conflict and the rest of
//! the tree is still checked.

mod analysis;
mod conflict;
mod context;
mod dependencies;
mod rules;
mod tree;
mod typing;

pub use analysis::{Analysis, Analyzer};
pub use conflict::{Conflict, ConflictKind, Severity};
pub use context::{Context, Definition, SourceLookup, SourceType};
pub use dependencies::{CallSite, CallTarget, Dependencies};
pub use tree::Tree;
