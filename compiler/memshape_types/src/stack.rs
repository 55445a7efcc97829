//! Stack growth for deeply nested type definitions.
//!
//! Layout, promotion and zero-value construction recurse once per nesting
//! level. Generated or adversarial inputs can nest thousands of levels, so
//! recursive entry points run inside [`ensure_sufficient_stack`].

/// Grow when less than this remains.
const RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment.
const GROWTH: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
