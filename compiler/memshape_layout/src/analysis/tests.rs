use pretty_assertions::assert_eq;

use memshape_types::SizeAlign;

use super::*;

fn seq(shapes: &[(u64, u64)]) -> Layout {
    Layout::sequential(shapes.iter().map(|&(size, align)| SizeAlign::new(size, align)))
        .unwrap_or_else(|| Layout::scalar(SizeAlign::ZERO))
}

/// `{ a bool; b int64; c bool }` on a 64-bit target.
fn bool_sandwich() -> Layout {
    seq(&[(1, 1), (8, 8), (1, 1)])
}

#[test]
fn padding_accounting() {
    let layout = bool_sandwich();
    assert_eq!(layout.size(), 24);

    let summary = padding(&layout);
    assert_eq!(summary.padding_after, vec![7, 0, 7]);
    assert_eq!(summary.data_bytes, 10);
    assert_eq!(summary.interior_padding, 7);
    assert_eq!(summary.trailing_padding, 7);
    assert_eq!(summary.total_padding(), 14);
    assert!((summary.percentage() - 14.0 * 100.0 / 24.0).abs() < 1e-9);
}

#[test]
fn padding_of_tight_and_empty_layouts() {
    let tight = seq(&[(8, 8), (4, 4), (2, 2), (1, 1), (1, 1)]);
    let summary = padding(&tight);
    assert_eq!(summary.total_padding(), 0);
    assert_eq!(summary.data_bytes, 16);

    let empty = seq(&[]);
    let summary = padding(&empty);
    assert_eq!(summary.padding_after, Vec::<u64>::new());
    assert!(summary.percentage().abs() < f64::EPSILON);
}

#[test]
fn reordering_sorts_by_alignment_then_size() {
    let layout = bool_sandwich();
    let suggestion = suggest_reordering(&layout);
    assert_eq!(suggestion.order, vec![1, 0, 2]);
    assert_eq!(suggestion.original_size, 24);
    assert_eq!(suggestion.optimized_size, 16);
    assert_eq!(suggestion.bytes_saved(), 8);
    assert!(suggestion.shrinks());
}

#[test]
fn reordering_never_grows() {
    // User: Base(16,8) Name(16,8) Email(16,8) Active(1,1): already optimal.
    let user = seq(&[(16, 8), (16, 8), (16, 8), (1, 1)]);
    let suggestion = suggest_reordering(&user);
    assert_eq!(suggestion.order, vec![0, 1, 2, 3]);
    assert_eq!(suggestion.optimized_size, 56);
    assert_eq!(suggestion.bytes_saved(), 0);
    assert!(!suggestion.shrinks());
}

#[test]
fn reordering_prefers_larger_fields_on_ties() {
    let layout = seq(&[(4, 4), (12, 4), (1, 1)]);
    assert_eq!(suggest_reordering(&layout).order, vec![1, 0, 2]);
}

#[test]
fn cache_line_breakdown() {
    // Article-like shape: 56-byte block, 16-byte block straddling line 0/1,
    // then strings, ints and a bool; 128 bytes total.
    let layout = seq(&[(56, 8), (16, 8), (16, 8), (16, 8), (8, 8), (1, 1), (8, 8)]);
    assert_eq!(layout.size(), 128);

    let lines = cache_lines(&layout, 64);
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        CacheLine {
            index: 0,
            lines: 1,
            start: 0,
            end: 64,
            fields: vec![0, 1],
            bytes_used: 64,
            bytes_padding: 0,
        }
    );
    assert_eq!(lines[1].fields, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(lines[1].bytes_used, 57);
    assert_eq!(lines[1].bytes_padding, 7);

    assert_eq!(crossing_fields(&layout, 64), vec![1]);
    assert_eq!(crossing_fields(&layout, 128), Vec::<usize>::new());
}

#[test]
fn short_last_line() {
    let layout = seq(&[(8, 8), (8, 8), (1, 1)]);
    let lines = cache_lines(&layout, 16);
    assert_eq!(lines.len(), 2);
    assert_eq!((lines[1].start, lines[1].end), (16, 24));
    assert_eq!((lines[1].bytes_used, lines[1].bytes_padding), (1, 7));
}

#[test]
fn lines_inside_one_field_are_merged() {
    // 8-byte header, 200-byte block, trailing bool: 216 bytes over 16-byte lines.
    let layout = seq(&[(8, 8), (200, 1), (1, 1)]);
    assert_eq!(layout.size(), 216);

    let lines = cache_lines(&layout, 16);
    let spans: Vec<(u64, u64, u64, u64)> = lines
        .iter()
        .map(|entry| (entry.index, entry.lines, entry.start, entry.end))
        .collect();
    assert_eq!(spans, vec![(0, 1, 0, 16), (1, 12, 16, 208), (13, 1, 208, 216)]);
    assert_eq!(lines[0].fields, vec![0, 1]);
    assert_eq!(lines[1].fields, vec![1]);
    assert_eq!(lines[2].fields, vec![2]);
    assert_eq!((lines[2].bytes_used, lines[2].bytes_padding), (1, 7));
    assert_eq!(lines.iter().map(|entry| entry.bytes_used).sum::<u64>(), 209);
}

#[test]
fn huge_field_produces_few_lines() {
    let layout = seq(&[(1 << 40, 1), (1, 1)]);

    let lines = cache_lines(&layout, 64);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].lines, (1 << 40) / 64);
    assert_eq!(lines[1].start, 1 << 40);
    assert_eq!(lines[1].fields, vec![1]);
}

#[test]
fn zero_sized_layout_has_no_lines() {
    let layout = seq(&[(0, 8)]);
    assert!(cache_lines(&layout, 64).is_empty());
    assert!(crossing_fields(&layout, 64).is_empty());
}

#[test]
fn flags_summarize() {
    let sandwich = LayoutFlags::compute(&bool_sandwich(), 64);
    assert_eq!(
        sandwich,
        LayoutFlags::HAS_INTERIOR_PADDING
            | LayoutFlags::HAS_TRAILING_PADDING
            | LayoutFlags::REORDER_SHRINKS
    );
    assert!(sandwich.has_padding());

    let empty = LayoutFlags::compute(&seq(&[]), 64);
    assert_eq!(empty, LayoutFlags::ZERO_SIZED);
    assert!(!empty.has_padding());

    let straddling = LayoutFlags::compute(&seq(&[(4, 4), (8, 4)]), 8);
    assert!(straddling.contains(LayoutFlags::CROSSES_CACHE_LINE));
}
