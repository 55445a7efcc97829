//! Type identity handle.

use std::fmt;

use crate::primitive::PrimitiveKind;

/// A 32-bit index into a [`TypeRegistry`](crate::TypeRegistry).
///
/// Type identity is index identity: two declarations with the same shape
/// get different ids and are laid out, cached and resolved independently.
/// Primitives, `string` and `[]byte` have fixed ids in every registry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const BOOL: Self = Self::of_primitive(PrimitiveKind::Bool);
    pub const INT8: Self = Self::of_primitive(PrimitiveKind::Int8);
    pub const INT16: Self = Self::of_primitive(PrimitiveKind::Int16);
    pub const INT32: Self = Self::of_primitive(PrimitiveKind::Int32);
    pub const INT64: Self = Self::of_primitive(PrimitiveKind::Int64);
    pub const UINT8: Self = Self::of_primitive(PrimitiveKind::Uint8);
    pub const UINT16: Self = Self::of_primitive(PrimitiveKind::Uint16);
    pub const UINT32: Self = Self::of_primitive(PrimitiveKind::Uint32);
    pub const UINT64: Self = Self::of_primitive(PrimitiveKind::Uint64);
    pub const FLOAT32: Self = Self::of_primitive(PrimitiveKind::Float32);
    pub const FLOAT64: Self = Self::of_primitive(PrimitiveKind::Float64);
    pub const COMPLEX64: Self = Self::of_primitive(PrimitiveKind::Complex64);
    pub const COMPLEX128: Self = Self::of_primitive(PrimitiveKind::Complex128);
    pub const INT: Self = Self::of_primitive(PrimitiveKind::Int);
    pub const UINT: Self = Self::of_primitive(PrimitiveKind::Uint);
    pub const UINTPTR: Self = Self::of_primitive(PrimitiveKind::Uintptr);

    /// The `string` descriptor.
    pub const STRING: Self = Self(PrimitiveKind::ALL.len() as u32);
    /// `[]byte`.
    pub const BYTES: Self = Self(Self::STRING.0 + 1);

    /// First index handed out for user and anonymous composite types.
    pub const FIRST_DYNAMIC: u32 = Self::BYTES.0 + 1;

    /// Fixed id of a primitive kind.
    #[inline]
    pub const fn of_primitive(kind: PrimitiveKind) -> Self {
        Self(kind as u32)
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// True for the pre-interned ids (primitives, `string`, `[]byte`).
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::STRING => write!(f, "TypeId::STRING"),
            Self::BYTES => write!(f, "TypeId::BYTES"),
            _ if (self.0 as usize) < PrimitiveKind::ALL.len() => {
                write!(f, "TypeId::{}", PrimitiveKind::ALL[self.0 as usize])
            }
            _ => write!(f, "TypeId({})", self.0),
        }
    }
}
