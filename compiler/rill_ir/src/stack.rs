//! Native stack growth for the recursive tree passes.

/// Below this much remaining stack, grow before recursing further.
const RED_ZONE: usize = 100 * 1024;

/// Size of each freshly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted. Wrap recursive calls over deeply nested trees with it.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
