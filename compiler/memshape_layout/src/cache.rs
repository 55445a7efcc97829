//! Memoized, thread-safe layout lookup.
//!
//! # Single flight
//!
//! Each `TypeId` owns a slot: `Arc<Mutex<Option<Arc<Layout>>>>`. The
//! sharded map is only touched long enough to fetch or create the slot;
//! the slot's own mutex is held for the computation. So:
//!
//! - concurrent callers for the same type serialize on its slot, the first
//!   computes and the rest reuse the finished `Arc<Layout>`
//! - callers for different types never wait on each other
//! - a failed computation leaves the slot empty, so a later call retries
//!   from scratch instead of seeing a partial entry
//!
//! Keys are type identity, never shape: two distinct declarations with the
//! same fields get independent entries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxBuildHasher;

use memshape_types::{PrimitiveTable, Target, TypeId, TypeRegistry};

use crate::compute::{self, LayoutError};
use crate::layout::Layout;

type Slot = Arc<Mutex<Option<Arc<Layout>>>>;

/// Shared layout cache for one registry and one target.
pub struct LayoutCache {
    registry: Arc<TypeRegistry>,
    table: PrimitiveTable,
    slots: DashMap<TypeId, Slot, FxBuildHasher>,
    /// Number of underlying layout computations performed.
    computations: AtomicUsize,
}

impl LayoutCache {
    /// Cache using the default primitive table for `target`.
    pub fn new(registry: Arc<TypeRegistry>, target: Target) -> Self {
        Self::with_table(registry, PrimitiveTable::for_target(target))
    }

    /// Cache using a caller-supplied primitive table.
    pub fn with_table(registry: Arc<TypeRegistry>, table: PrimitiveTable) -> Self {
        Self {
            registry,
            table,
            slots: DashMap::with_hasher(FxBuildHasher::default()),
            computations: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn table(&self) -> &PrimitiveTable {
        &self.table
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.table.target()
    }

    /// Layout of `ty`, computing it at most once.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_layout(&self, ty: TypeId) -> Result<Arc<Layout>, LayoutError> {
        let slot = self.slot(ty);
        let mut entry = slot.lock();
        if let Some(layout) = entry.as_ref() {
            return Ok(Arc::clone(layout));
        }

        self.computations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(ty = %self.registry.display(ty), "layout cache miss");

        let layout = Arc::new(compute::layout(&self.registry, &self.table, ty)?);
        *entry = Some(Arc::clone(&layout));
        Ok(layout)
    }

    /// Layouts for many types, computed in parallel.
    ///
    /// Results are returned in the order of `types`.
    pub fn get_many(&self, types: &[TypeId]) -> Vec<Result<Arc<Layout>, LayoutError>> {
        types.par_iter().map(|&ty| self.get_layout(ty)).collect()
    }

    /// The finished layout of `ty`, if one is cached. Waits for an
    /// in-flight computation of `ty` but never starts one.
    pub fn cached(&self, ty: TypeId) -> Option<Arc<Layout>> {
        let slot = Arc::clone(self.slots.get(&ty)?.value());
        let entry = slot.lock();
        entry.clone()
    }

    /// How many times the layout algorithm has actually run.
    #[inline]
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Fetch or create the slot for `ty`. The map guard is released before
    /// returning so the slot can be locked without blocking its shard.
    fn slot(&self, ty: TypeId) -> Slot {
        if let Some(slot) = self.slots.get(&ty) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(ty).or_default().value())
    }
}

impl std::fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutCache")
            .field("target", &self.table.target())
            .field("entries", &self.slots.len())
            .field("computations", &self.computations())
            .finish_non_exhaustive()
    }
}
