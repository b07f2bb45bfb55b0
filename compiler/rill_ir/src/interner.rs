//! String interner for identifiers and literal text.
//!
//! One lock guards the whole table. Interning happens while building trees and
//! registries; evaluation and analysis only read.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Interner mapping strings to [`Name`]s and back.
///
/// Interned strings are leaked so lookups can hand out `&'static str`
/// without holding the lock.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            table: RwLock::new(InternTable {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern `text`, returning the existing name if it was seen before.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` distinct strings are interned.
    pub fn intern(&self, text: &str) -> Name {
        if let Some(&index) = self.table.read().map.get(text) {
            return Name::from_raw(index);
        }

        let mut table = self.table.write();
        // Another writer may have won the race between the two locks.
        if let Some(&index) = table.map.get(text) {
            return Name::from_raw(index);
        }

        let index = u32::try_from(table.strings.len())
            .unwrap_or_else(|_| panic!("interner exceeded {} strings", u32::MAX));
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        table.strings.push(leaked);
        table.map.insert(leaked, index);
        Name::from_raw(index)
    }

    /// Text of a name. Unknown names (from another interner) read as `""`.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Name of `text` if it was already interned.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.table.read().map.get(text).map(|&index| Name::from_raw(index))
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Cloneable handle to one interner, shared by a project's trees,
/// native registry and stream registry.
#[derive(Clone, Debug, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }

    /// Whether two handles point at the same interner.
    pub fn same(&self, other: &SharedInterner) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &StringInterner {
        &self.0
    }
}

#[cfg(test)]
mod tests;
