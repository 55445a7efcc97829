//! The `Layout` record.

use memshape_types::{round_up, SizeAlign};

/// Placement of one field inside its struct.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSlot {
    pub offset: u64,
    pub size: u64,
    pub align: u64,
}

impl FieldSlot {
    /// One past the last byte of the field.
    #[inline]
    pub const fn end(&self) -> u64 {
        self.offset + self.size
    }

    #[inline]
    pub const fn size_align(&self) -> SizeAlign {
        SizeAlign::new(self.size, self.align)
    }
}

/// Size, alignment and field placement of a type.
///
/// Invariants, checked by construction:
/// - `size % align == 0`
/// - every field offset is a multiple of that field's alignment
/// - every field ends at or before `size`
/// - fields appear in declaration order with non-decreasing offsets
///
/// Non-struct types have no field slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    size: u64,
    align: u64,
    fields: Vec<FieldSlot>,
}

impl Layout {
    /// Layout of a type without fields.
    pub fn scalar(shape: SizeAlign) -> Self {
        Self {
            size: shape.size,
            align: shape.align,
            fields: Vec::new(),
        }
    }

    /// Place fields one after another in the given order.
    ///
    /// Each field starts at the running offset rounded up to its alignment;
    /// the total is rounded up to the largest field alignment (at least 1).
    /// Returns `None` if a size overflows `u64`.
    pub fn sequential<I>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = SizeAlign>,
    {
        let mut offset = 0u64;
        let mut max_align = 1u64;
        let mut slots = Vec::new();

        for field in fields {
            offset = round_up(offset, field.align)?;
            slots.push(FieldSlot {
                offset,
                size: field.size,
                align: field.align,
            });
            offset = offset.checked_add(field.size)?;
            max_align = max_align.max(field.align);
        }

        Some(Self {
            size: round_up(offset, max_align)?,
            align: max_align,
            fields: slots,
        })
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn align(&self) -> u64 {
        self.align
    }

    #[inline]
    pub fn size_align(&self) -> SizeAlign {
        SizeAlign::new(self.size, self.align)
    }

    /// Field slots in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&FieldSlot> {
        self.fields.get(index)
    }

    /// Byte offset of field `index`.
    #[inline]
    pub fn field_offset(&self, index: usize) -> Option<u64> {
        self.fields.get(index).map(|slot| slot.offset)
    }

    pub fn field_offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.fields.iter().map(|slot| slot.offset)
    }

    #[inline]
    pub fn is_zero_sized(&self) -> bool {
        self.size == 0
    }
}
