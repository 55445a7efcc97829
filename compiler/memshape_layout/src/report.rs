//! Exportable per-struct summaries.

use memshape_types::{Target, TypeId, TypeRegistry};

use crate::analysis::{cache_lines, crossing_fields, padding, suggest_reordering};
use crate::compute::LayoutError;
use crate::layout::Layout;

/// One row per field.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldReport {
    pub name: String,
    pub type_name: String,
    pub embedded: bool,
    pub offset: u64,
    pub size: u64,
    pub alignment: u64,
    pub padding_after: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheLineReport {
    pub line: u64,
    /// Lines this row stands for; runs inside one field are merged.
    pub line_count: u64,
    pub start_offset: u64,
    pub end_offset: u64,
    pub fields: Vec<String>,
    pub bytes_used: u64,
    pub bytes_padding: u64,
}

/// Everything known about one struct's layout, with names resolved.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructReport {
    pub name: String,
    pub total_size: u64,
    pub alignment: u64,
    pub total_padding: u64,
    pub padding_percentage: f64,
    pub fields: Vec<FieldReport>,
    pub cache_lines: Vec<CacheLineReport>,
    /// Fields spanning more than one cache line.
    pub hot_fields: Vec<String>,
    pub optimized_size: u64,
    pub bytes_saved: u64,
    pub suggested_order: Vec<String>,
}

/// A batch of struct reports for one target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportReport {
    pub target: Target,
    pub structs: Vec<StructReport>,
}

/// Build the report for struct `ty` from its finished layout.
pub fn struct_report(
    registry: &TypeRegistry,
    target: Target,
    ty: TypeId,
    layout: &Layout,
) -> Result<StructReport, LayoutError> {
    let def = registry.struct_def(ty).ok_or_else(|| LayoutError::NotAStruct {
        name: registry.display(ty),
    })?;
    let field_name = |i: usize| def.fields[i].name.clone();

    let summary = padding(layout);
    let fields = def
        .fields
        .iter()
        .zip(layout.fields())
        .zip(&summary.padding_after)
        .map(|((field, slot), &padding_after)| FieldReport {
            name: field.name.clone(),
            type_name: registry.display(field.ty),
            embedded: field.embedded,
            offset: slot.offset,
            size: slot.size,
            alignment: slot.align,
            padding_after,
        })
        .collect();

    let line = target.cache_line();
    let cache_lines = cache_lines(layout, line)
        .into_iter()
        .map(|cache_line| CacheLineReport {
            line: cache_line.index,
            line_count: cache_line.lines,
            start_offset: cache_line.start,
            end_offset: cache_line.end,
            fields: cache_line.fields.into_iter().map(field_name).collect(),
            bytes_used: cache_line.bytes_used,
            bytes_padding: cache_line.bytes_padding,
        })
        .collect();

    let reordering = suggest_reordering(layout);

    Ok(StructReport {
        name: registry.display(ty),
        total_size: layout.size(),
        alignment: layout.align(),
        total_padding: summary.total_padding(),
        padding_percentage: summary.percentage(),
        fields,
        cache_lines,
        hot_fields: crossing_fields(layout, line)
            .into_iter()
            .map(field_name)
            .collect(),
        optimized_size: reordering.optimized_size,
        bytes_saved: reordering.bytes_saved(),
        suggested_order: reordering.order.iter().map(|&i| field_name(i)).collect(),
    })
}
