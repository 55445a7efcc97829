//! Field promotion for embedded structs.
//!
//! Given a struct, [`resolve_selectors`] works out which names it answers
//! to: its own fields plus everything promoted from embedded structs,
//! embedded pointers to structs and embedded interfaces. Shallower names
//! shadow deeper ones; two names at the same shallowest depth are
//! ambiguous.
//!
//! [`access`] then follows a resolved selector through a [`Value`].

mod access;
mod resolve;
mod selector;
mod value;

pub use access::{access, access_promoted, AccessError, Accessed};
pub use resolve::{resolve_path, resolve_selectors, ResolveError};
pub use selector::{Selector, SelectorEntry, SelectorError, SelectorPath, SelectorTable, SelectorTarget};
pub use value::{Value, ValueError, MAX_ZERO_ELEMENTS};
