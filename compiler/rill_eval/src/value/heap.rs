//! Shared, immutable heap storage for values.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Reference-counted storage behind every heap-backed [`Value`](super::Value).
///
/// The constructor is private to the value module, so heap values can only
/// be created through the `Value` factory methods.
#[derive(Eq, PartialEq, Hash)]
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    pub(super) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T: ?Sized> Heap<T> {
    /// Whether both handles share one allocation.
    pub fn ptr_eq(this: &Heap<T>, other: &Heap<T>) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug + ?Sized> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Display + ?Sized> fmt::Display for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}
