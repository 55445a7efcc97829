//! One registry, one target, every query.

use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::FxBuildHasher;

use memshape_layout::{struct_report, ExportReport, Layout, LayoutCache, LayoutError, StructReport};
use memshape_promote::{
    access_promoted, resolve_path, resolve_selectors, AccessError, Accessed, ResolveError,
    SelectorTable, SelectorTarget, Value, ValueError,
};
use memshape_types::{PrimitiveTable, Target, TargetError, TypeError, TypeId, TypeRegistry};

/// Any error an [`Engine`] query can produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Layouts, selector tables and reports over a frozen registry.
///
/// The word size is fixed by the target for the lifetime of the engine.
/// All queries take `&self`; an engine is meant to be shared across
/// threads.
pub struct Engine {
    cache: LayoutCache,
    selectors: DashMap<TypeId, Arc<SelectorTable>, FxBuildHasher>,
}

impl Engine {
    pub fn new(registry: Arc<TypeRegistry>, target: Target) -> Self {
        Self::with_table(registry, PrimitiveTable::for_target(target))
    }

    /// Engine with a caller-configured primitive table.
    pub fn with_table(registry: Arc<TypeRegistry>, table: PrimitiveTable) -> Self {
        Self {
            cache: LayoutCache::with_table(registry, table),
            selectors: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Engine for the target named by `MEMSHAPE_ARCH`, or the host.
    pub fn from_env(registry: Arc<TypeRegistry>) -> Result<Self, Error> {
        Ok(Self::new(registry, Target::from_env()?))
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        self.cache.registry()
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.cache.target()
    }

    #[inline]
    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Cached layout of `ty`.
    pub fn layout(&self, ty: TypeId) -> Result<Arc<Layout>, LayoutError> {
        self.cache.get_layout(ty)
    }

    /// Layouts of every defined struct, computed on the rayon pool.
    pub fn layout_all(&self) -> Vec<(TypeId, Result<Arc<Layout>, LayoutError>)> {
        let structs: Vec<TypeId> = self.registry().structs().collect();
        tracing::debug!(count = structs.len(), "laying out all structs");
        structs
            .par_iter()
            .map(|&ty| (ty, self.cache.get_layout(ty)))
            .collect()
    }

    /// Memoized selector table of struct `ty`.
    pub fn selectors(&self, ty: TypeId) -> Result<Arc<SelectorTable>, ResolveError> {
        if let Some(table) = self.selectors.get(&ty) {
            return Ok(Arc::clone(table.value()));
        }
        let table = Arc::new(resolve_selectors(self.registry(), ty)?);
        Ok(Arc::clone(self.selectors.entry(ty).or_insert(table).value()))
    }

    /// Read the bare selector `name` from an instance of struct `ty`.
    pub fn access<'v>(&self, ty: TypeId, value: &'v Value, name: &str) -> Result<Accessed<'v>, Error> {
        let table = self.selectors(ty)?;
        Ok(access_promoted(&table, value, name)?)
    }

    /// The zero value of `ty`.
    pub fn zero_value(&self, ty: TypeId) -> Result<Value, ValueError> {
        Value::zero(self.registry(), ty)
    }

    /// Byte offset of a field selector (bare or dotted) within struct `ty`.
    ///
    /// `None` when the selector names a method or its path dereferences a
    /// pointer, since the member then lives outside `ty`'s bytes.
    pub fn offset_of(&self, ty: TypeId, selector: &str) -> Result<Option<u64>, Error> {
        let entry = resolve_path(self.registry(), ty, selector)?;
        if entry.through_pointer || matches!(entry.target, SelectorTarget::Method { .. }) {
            return Ok(None);
        }

        let registry = self.registry();
        let mut owner = ty;
        let mut offset = 0;
        for &index in &entry.path {
            let not_a_struct = || ResolveError::NotAStruct {
                name: registry.display(owner),
            };
            let layout = self.layout(owner)?;
            offset += layout.field_offset(index).ok_or_else(not_a_struct)?;
            owner = registry
                .struct_def(owner)
                .and_then(|def| def.fields.get(index))
                .map(|field| field.ty)
                .ok_or_else(not_a_struct)?;
        }
        Ok(Some(offset))
    }

    /// Layout report for struct `ty`.
    pub fn report(&self, ty: TypeId) -> Result<StructReport, LayoutError> {
        let layout = self.layout(ty)?;
        struct_report(self.registry(), self.target(), ty, &layout)
    }

    /// Reports for every defined struct, in declaration order.
    pub fn export(&self) -> Result<ExportReport, LayoutError> {
        let structs: Vec<TypeId> = self.registry().structs().collect();
        let structs = structs
            .par_iter()
            .map(|&ty| self.report(ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExportReport {
            target: self.target(),
            structs,
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cache", &self.cache)
            .field("selector_tables", &self.selectors.len())
            .finish()
    }
}
