//! Arena indices for syntax tree nodes.

use std::fmt;

/// Index of a node in an [`Ast`](crate::Ast) arena.
///
/// Stable for the lifetime of the tree, so analysis and evaluation caches
/// key on it instead of on node addresses.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Marks an absent child in a partial or erroneous tree.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A run of child ids stored contiguously in the tree's list arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NodeRange {
    pub start: u32,
    pub len: u32,
}

impl NodeRange {
    pub const EMPTY: NodeRange = NodeRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        NodeRange { start, len }
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}
