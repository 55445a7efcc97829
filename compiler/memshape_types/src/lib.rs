//! Type descriptors and target configuration for memshape.
//!
//! This crate holds everything the layout and promotion passes read:
//!
//! - [`Target`]: word size, scalar alignment cap, cache line size
//! - [`PrimitiveTable`]: (size, align) per primitive kind on a target
//! - [`DescriptorKind`]: fixed word-count shapes (pointer, string, slice,
//!   interface, map, chan, func)
//! - [`TypeRegistry`]: type definitions addressed by [`TypeId`]
//!
//! Nothing here computes a struct layout; see `memshape_layout`.

mod descriptor;
mod id;
mod primitive;
mod registry;
mod stack;
mod target;

pub use descriptor::DescriptorKind;
pub use id::TypeId;
pub use primitive::{round_up, PrimitiveKind, PrimitiveTable, SizeAlign, UnknownPrimitiveKind};
pub use registry::{
    FieldDef, InterfaceDef, StructDef, TypeEntry, TypeError, TypeKind, TypeRegistry,
};
pub use stack::ensure_sufficient_stack;
pub use target::{Arch, Target, TargetError, WordSize, ARCH_ENV_VAR, DEFAULT_CACHE_LINE};
