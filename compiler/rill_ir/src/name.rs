//! Interned identifiers.

use std::fmt;

/// An interned identifier.
///
/// Comparing two names is an integer comparison; the text lives in the
/// [`StringInterner`](crate::StringInterner) that produced it. Names from
/// different interners must not be mixed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct Name(u32);

impl Name {
    /// The empty string, pre-interned at index 0. Marks anonymous definitions.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}
