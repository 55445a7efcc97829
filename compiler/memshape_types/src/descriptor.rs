//! Descriptor types: fixed multi-word shapes.
//!
//! A descriptor's size depends only on the word size, never on the
//! payload it describes, so layout never recurses through one.

/// Kinds of fixed-shape descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DescriptorKind {
    /// `*T`: one data pointer.
    Pointer,
    /// `string`: data pointer + length.
    String,
    /// `[]T`: data pointer + length + capacity.
    Slice,
    /// Interface value: type-descriptor pointer + data pointer.
    Interface,
    /// `map[K]V`: handle to a runtime hash map.
    Map,
    /// `chan T`: handle to a runtime channel.
    Chan,
    /// `func(...)`: code or closure pointer.
    Func,
}

impl DescriptorKind {
    /// Number of machine words the descriptor occupies.
    #[inline]
    pub const fn words(self) -> u64 {
        match self {
            Self::Pointer | Self::Map | Self::Chan | Self::Func => 1,
            Self::String | Self::Interface => 2,
            Self::Slice => 3,
        }
    }
}
