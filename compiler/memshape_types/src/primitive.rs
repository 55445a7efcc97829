//! The primitive table: (size, alignment) per scalar kind.
//!
//! Every other layer asks this table about scalars. The default table for
//! a [`Target`] registers every [`PrimitiveKind`]; tests and exotic targets
//! can start from [`PrimitiveTable::empty`] and register only what they
//! need, in which case lookups of anything else fail with
//! [`UnknownPrimitiveKind`].

use std::fmt;

use rustc_hash::FxHashMap;

use crate::descriptor::DescriptorKind;
use crate::target::Target;

/// Built-in scalar kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Word-sized signed integer.
    Int,
    /// Word-sized unsigned integer.
    Uint,
    /// Word-sized integer large enough to hold a pointer.
    Uintptr,
}

impl PrimitiveKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Bool,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Float32,
        Self::Float64,
        Self::Complex64,
        Self::Complex128,
        Self::Int,
        Self::Uint,
        Self::Uintptr,
    ];

    /// Canonical source name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Uintptr => "uintptr",
        }
    }

    /// Parse a source name. `byte` and `rune` are aliases of `uint8` and
    /// `int32`.
    pub fn from_name(name: &str) -> Result<Self, UnknownPrimitiveKind> {
        let kind = match name {
            "bool" => Self::Bool,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "rune" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "int" => Self::Int,
            "uint" => Self::Uint,
            "uintptr" => Self::Uintptr,
            _ => return Err(UnknownPrimitiveKind::new(name)),
        };
        Ok(kind)
    }

    /// Natural (size, align) before the target's alignment cap.
    const fn natural(self, word: u64) -> (u64, u64) {
        match self {
            Self::Bool | Self::Int8 | Self::Uint8 => (1, 1),
            Self::Int16 | Self::Uint16 => (2, 2),
            Self::Int32 | Self::Uint32 | Self::Float32 => (4, 4),
            Self::Int64 | Self::Uint64 | Self::Float64 => (8, 8),
            // Two float32 halves.
            Self::Complex64 => (8, 4),
            Self::Complex128 => (16, 8),
            Self::Int | Self::Uint | Self::Uintptr => (word, word),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup of a primitive that the table does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown primitive kind `{name}`")]
pub struct UnknownPrimitiveKind {
    pub name: String,
}

impl UnknownPrimitiveKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A size and an alignment, both in bytes.
///
/// Invariant: `align` is a power of two and `size % align == 0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeAlign {
    pub size: u64,
    pub align: u64,
}

impl SizeAlign {
    /// Empty struct / zero-length shape.
    pub const ZERO: Self = Self { size: 0, align: 1 };

    #[inline]
    pub const fn new(size: u64, align: u64) -> Self {
        Self { size, align }
    }
}

/// Round `offset` up to the next multiple of `align` (`align >= 1`).
///
/// Returns `None` on overflow.
#[inline]
pub const fn round_up(offset: u64, align: u64) -> Option<u64> {
    debug_assert!(align >= 1);
    match offset.checked_add(align - 1) {
        Some(bumped) => Some(bumped / align * align),
        None => None,
    }
}

/// Primitive (size, align) mapping for one target.
#[derive(Clone, Debug)]
pub struct PrimitiveTable {
    target: Target,
    entries: FxHashMap<PrimitiveKind, SizeAlign>,
}

impl PrimitiveTable {
    /// Table with every [`PrimitiveKind`] registered for `target`.
    pub fn for_target(target: Target) -> Self {
        let mut table = Self::empty(target);
        let word = target.word();
        for kind in PrimitiveKind::ALL {
            let (size, align) = kind.natural(word);
            table.register(kind, size, align.min(target.max_align()));
        }
        table
    }

    /// Table with nothing registered.
    pub fn empty(target: Target) -> Self {
        Self {
            target,
            entries: FxHashMap::default(),
        }
    }

    /// Register or replace a kind's shape.
    ///
    /// `align` is clamped to at least 1.
    pub fn register(&mut self, kind: PrimitiveKind, size: u64, align: u64) -> &mut Self {
        self.entries
            .insert(kind, SizeAlign::new(size, align.max(1)));
        self
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Shape of a primitive kind.
    pub fn size_and_align(&self, kind: PrimitiveKind) -> Result<SizeAlign, UnknownPrimitiveKind> {
        self.entries
            .get(&kind)
            .copied()
            .ok_or_else(|| UnknownPrimitiveKind::new(kind.name()))
    }

    /// Shape of a primitive by source name (aliases included).
    pub fn size_and_align_of(&self, name: &str) -> Result<SizeAlign, UnknownPrimitiveKind> {
        self.size_and_align(PrimitiveKind::from_name(name)?)
    }

    /// Shape of a descriptor type. Always word-aligned.
    #[inline]
    pub fn descriptor(&self, kind: DescriptorKind) -> SizeAlign {
        let word = self.target.word();
        SizeAlign::new(kind.words() * word, word)
    }
}
