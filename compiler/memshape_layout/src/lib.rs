//! Struct layout for memshape.
//!
//! - [`layout`] / [`LayoutCx`]: the layout algorithm (pure)
//! - [`LayoutCache`]: memoized, single-flight wrapper keyed by `TypeId`
//! - [`analysis`]: padding, cache-line and reordering analyses
//! - [`struct_report`]: named, exportable summaries
//!
//! Layout and name promotion are independent passes; this crate never
//! looks at field names except to label reports.

pub mod analysis;
mod cache;
mod compute;
mod layout;
mod report;

pub use analysis::{CacheLine, LayoutFlags, PaddingSummary, Reordering};
pub use cache::LayoutCache;
pub use compute::{layout, LayoutCx, LayoutError};
pub use layout::{FieldSlot, Layout};
pub use report::{struct_report, CacheLineReport, ExportReport, FieldReport, StructReport};
