//! Rill IR - syntax tree and static vocabulary
//!
//! This crate holds the data every other Rill crate agrees on:
//! - Spans for source locations
//! - Names for interned identifiers
//! - `NodeId` indices into a flat node arena
//! - The closed `NodeKind` tree, owned by an immutable [`Ast`]
//! - Units of measure and static [`Type`]s
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`
//! - **Flatten Everything**: no boxed children, only `NodeId` indices
//! - **Immutable Trees**: an edit produces a new `Ast`; caches keyed by
//!   `NodeId` are thrown away wholesale with the tree they describe

mod arena;
pub mod ast;
mod builder;
mod interner;
mod name;
mod node_id;
mod span;
mod stack;
mod types;
mod unit;
pub mod visitor;

pub use arena::Ast;
pub use ast::{BinaryOp, Node, NodeKind, UnaryOp};
pub use builder::AstBuilder;
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use node_id::{NodeId, NodeRange};
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use types::Type;
pub use unit::Unit;
