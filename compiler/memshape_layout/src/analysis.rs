//! Read-only analyses over a finished [`Layout`].
//!
//! None of these change field order. [`suggest_reordering`] only reports
//! what a different declaration order would cost.

use bitflags::bitflags;

use crate::layout::Layout;

/// Where the bytes of a layout go.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaddingSummary {
    /// Unused bytes after each field, in declaration order. The last
    /// entry includes trailing padding.
    pub padding_after: Vec<u64>,
    pub data_bytes: u64,
    pub interior_padding: u64,
    pub trailing_padding: u64,
}

impl PaddingSummary {
    #[inline]
    pub fn total_padding(&self) -> u64 {
        self.interior_padding + self.trailing_padding
    }

    /// Padding as a percentage of `data + padding`; 0 for empty layouts.
    #[expect(clippy::cast_precision_loss, reason = "sizes far below 2^52")]
    pub fn percentage(&self) -> f64 {
        let total = self.data_bytes + self.total_padding();
        if total == 0 {
            return 0.0;
        }
        self.total_padding() as f64 * 100.0 / total as f64
    }
}

pub fn padding(layout: &Layout) -> PaddingSummary {
    let fields = layout.fields();
    let mut padding_after = Vec::with_capacity(fields.len());
    let mut interior_padding = 0;

    for (i, slot) in fields.iter().enumerate() {
        let next = fields.get(i + 1).map_or(layout.size(), |next| next.offset);
        let gap = next.saturating_sub(slot.end());
        if i + 1 < fields.len() {
            interior_padding += gap;
        }
        padding_after.push(gap);
    }

    let used_end = fields.last().map_or(0, |slot| slot.end());
    PaddingSummary {
        padding_after,
        data_bytes: fields.iter().map(|slot| slot.size).sum(),
        interior_padding,
        trailing_padding: layout.size().saturating_sub(used_end),
    }
}

/// One cache line's worth of a layout, or a run of lines that a single
/// field fills completely.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheLine {
    /// Index of the first line in the entry.
    pub index: u64,
    /// Number of lines the entry stands for; above 1 only for a run
    /// inside one field.
    pub lines: u64,
    pub start: u64,
    /// Exclusive; the last line may be shorter than the line size.
    pub end: u64,
    /// Indices of fields with at least one byte in this entry.
    pub fields: Vec<usize>,
    pub bytes_used: u64,
    pub bytes_padding: u64,
}

/// Split a layout into cache lines of `line` bytes (`line >= 1`).
///
/// Consecutive lines lying entirely inside one field are merged into a
/// single entry, so the result grows with the field count rather than the
/// layout size.
pub fn cache_lines(layout: &Layout, line: u64) -> Vec<CacheLine> {
    let line = line.max(1);
    let size = layout.size();
    let count = size.div_ceil(line);
    let fields = layout.fields();

    let mut out = Vec::new();
    let mut first = 0;
    let mut index = 0;

    while index < count {
        let start = index * line;
        let end = (start + line).min(size);

        // Field ends never decrease, so fields before `first` are done.
        while fields.get(first).is_some_and(|slot| slot.end() <= start) {
            first += 1;
        }

        let covering = fields
            .get(first)
            .filter(|slot| slot.offset <= start && slot.end() >= start + line);
        if let Some(slot) = covering {
            let run_end = slot.end() / line;
            out.push(CacheLine {
                index,
                lines: run_end - index,
                start,
                end: run_end * line,
                fields: vec![first],
                bytes_used: run_end * line - start,
                bytes_padding: 0,
            });
            index = run_end;
            continue;
        }

        let mut touching = Vec::new();
        let mut bytes_used = 0;
        for (i, slot) in fields.iter().enumerate().skip(first) {
            if slot.offset >= end {
                break;
            }
            let overlap_start = slot.offset.max(start);
            let overlap_end = slot.end().min(end);
            if overlap_end > overlap_start {
                touching.push(i);
                bytes_used += overlap_end - overlap_start;
            }
        }

        out.push(CacheLine {
            index,
            lines: 1,
            start,
            end,
            fields: touching,
            bytes_used,
            bytes_padding: (end - start) - bytes_used,
        });
        index += 1;
    }

    out
}

/// Fields whose bytes span more than one cache line.
pub fn crossing_fields(layout: &Layout, line: u64) -> Vec<usize> {
    let line = line.max(1);
    layout
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.size > 0 && slot.offset / line != (slot.end() - 1) / line)
        .map(|(i, _)| i)
        .collect()
}

/// A suggested declaration order and what it would save.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reordering {
    /// Field indices in suggested order.
    pub order: Vec<usize>,
    pub original_size: u64,
    pub optimized_size: u64,
}

impl Reordering {
    #[inline]
    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.optimized_size)
    }

    #[inline]
    pub fn shrinks(&self) -> bool {
        self.optimized_size < self.original_size
    }
}

/// Order fields by alignment, then size, both descending. Ties keep
/// declaration order.
pub fn suggest_reordering(layout: &Layout) -> Reordering {
    let fields = layout.fields();
    let mut order: Vec<usize> = (0..fields.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&fields[a], &fields[b]);
        b.align.cmp(&a.align).then(b.size.cmp(&a.size))
    });

    let optimized_size = Layout::sequential(order.iter().map(|&i| fields[i].size_align()))
        .map_or(layout.size(), |optimized| optimized.size());

    Reordering {
        order,
        original_size: layout.size(),
        optimized_size,
    }
}

bitflags! {
    /// Summary properties of a layout.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct LayoutFlags: u8 {
        const ZERO_SIZED = 1 << 0;
        /// Gaps between fields.
        const HAS_INTERIOR_PADDING = 1 << 1;
        /// Gap after the last field.
        const HAS_TRAILING_PADDING = 1 << 2;
        /// Some field spans two cache lines.
        const CROSSES_CACHE_LINE = 1 << 3;
        /// Reordering fields would make the type smaller.
        const REORDER_SHRINKS = 1 << 4;
    }
}

impl LayoutFlags {
    pub fn compute(layout: &Layout, line: u64) -> Self {
        let mut flags = Self::empty();
        let summary = padding(layout);

        flags.set(Self::ZERO_SIZED, layout.is_zero_sized());
        flags.set(Self::HAS_INTERIOR_PADDING, summary.interior_padding > 0);
        flags.set(Self::HAS_TRAILING_PADDING, summary.trailing_padding > 0);
        flags.set(
            Self::CROSSES_CACHE_LINE,
            !crossing_fields(layout, line).is_empty(),
        );
        flags.set(Self::REORDER_SHRINKS, suggest_reordering(layout).shrinks());
        flags
    }

    #[inline]
    pub const fn has_padding(self) -> bool {
        self.intersects(Self::HAS_INTERIOR_PADDING.union(Self::HAS_TRAILING_PADDING))
    }
}

#[cfg(test)]
mod tests;
