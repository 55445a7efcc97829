//! The layout algorithm.
//!
//! Structural recursion over the registry:
//!
//! - primitives come from the [`PrimitiveTable`]
//! - descriptors (pointer, string, slice, interface, map, chan, func) are
//!   terminal and never look at what they point to
//! - arrays take the element's alignment and `count` times its size
//! - structs place fields in declaration order, rounding the cursor up to
//!   each field's alignment, then pad the total to the largest alignment
//!
//! Embedded fields are placed exactly like named ones. Names are a
//! separate pass (`memshape_promote`).
//!
//! A struct or array that contains itself other than through a descriptor
//! has no finite size. Types being computed sit on an in-progress stack;
//! meeting one again fails with [`LayoutError::Cyclic`].

use rustc_hash::FxHashMap;

use memshape_types::{
    ensure_sufficient_stack, DescriptorKind, PrimitiveTable, SizeAlign, StructDef, TypeId,
    TypeKind, TypeRegistry, UnknownPrimitiveKind,
};

use crate::layout::Layout;

/// Errors from layout computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("type `{name}` contains itself without indirection ({})", .cycle.join(" -> "))]
    Cyclic { name: String, cycle: Vec<String> },

    #[error("type `{name}` is declared but never defined")]
    Incomplete { name: String },

    #[error("size of `{name}` overflows")]
    Overflow { name: String },

    #[error("type `{name}` is not a struct")]
    NotAStruct { name: String },

    #[error("no type with id {0:?} in this registry")]
    UnknownTypeId(TypeId),

    #[error(transparent)]
    UnknownPrimitiveKind(#[from] UnknownPrimitiveKind),
}

/// Compute the layout of `ty` from scratch.
///
/// Pure: reads only the registry and the table. Safe to call from any
/// number of threads at once.
#[tracing::instrument(level = "trace", skip(registry, table))]
pub fn layout(
    registry: &TypeRegistry,
    table: &PrimitiveTable,
    ty: TypeId,
) -> Result<Layout, LayoutError> {
    LayoutCx::new(registry, table).layout(ty)
}

/// Layout context for a batch of related computations.
///
/// Remembers the (size, align) of every type it has finished so shared
/// field types are only walked once per context.
pub struct LayoutCx<'a> {
    registry: &'a TypeRegistry,
    table: &'a PrimitiveTable,
    memo: FxHashMap<TypeId, SizeAlign>,
    /// Structs and arrays currently being computed, outermost first.
    in_progress: Vec<TypeId>,
}

impl<'a> LayoutCx<'a> {
    pub fn new(registry: &'a TypeRegistry, table: &'a PrimitiveTable) -> Self {
        Self {
            registry,
            table,
            memo: FxHashMap::default(),
            in_progress: Vec::new(),
        }
    }

    /// Full layout of `ty`, including field slots for structs.
    pub fn layout(&mut self, ty: TypeId) -> Result<Layout, LayoutError> {
        let registry = self.registry;
        match registry.kind(ty) {
            Some(TypeKind::Struct(def)) => {
                let layout = self.struct_layout(ty, def)?;
                self.memo.insert(ty, layout.size_align());
                Ok(layout)
            }
            _ => self.size_align(ty).map(Layout::scalar),
        }
    }

    /// Size and alignment of `ty`.
    pub fn size_align(&mut self, ty: TypeId) -> Result<SizeAlign, LayoutError> {
        if let Some(&shape) = self.memo.get(&ty) {
            return Ok(shape);
        }
        let shape = ensure_sufficient_stack(|| self.compute(ty))?;
        self.memo.insert(ty, shape);
        Ok(shape)
    }

    fn compute(&mut self, ty: TypeId) -> Result<SizeAlign, LayoutError> {
        let registry = self.registry;
        let entry = registry.get(ty).ok_or(LayoutError::UnknownTypeId(ty))?;

        let shape = match &entry.kind {
            TypeKind::Primitive(kind) => self.table.size_and_align(*kind)?,
            TypeKind::String => self.table.descriptor(DescriptorKind::String),
            TypeKind::Pointer(_) => self.table.descriptor(DescriptorKind::Pointer),
            TypeKind::Slice(_) => self.table.descriptor(DescriptorKind::Slice),
            TypeKind::Interface(_) => self.table.descriptor(DescriptorKind::Interface),
            TypeKind::Map { .. } => self.table.descriptor(DescriptorKind::Map),
            TypeKind::Chan(_) => self.table.descriptor(DescriptorKind::Chan),
            TypeKind::Func => self.table.descriptor(DescriptorKind::Func),
            TypeKind::Array { elem, count } => {
                self.enter(ty)?;
                let result = self.array_shape(ty, *elem, *count);
                self.leave();
                result?
            }
            TypeKind::Struct(def) => self.struct_layout(ty, def)?.size_align(),
            TypeKind::Declared => {
                return Err(LayoutError::Incomplete {
                    name: registry.display(ty),
                })
            }
        };
        Ok(shape)
    }

    /// `[count]elem`. A zero-length array is size 0 but keeps the element's
    /// alignment.
    fn array_shape(&mut self, ty: TypeId, elem: TypeId, count: u64) -> Result<SizeAlign, LayoutError> {
        let elem = self.size_align(elem)?;
        let size = elem
            .size
            .checked_mul(count)
            .ok_or_else(|| self.overflow(ty))?;
        Ok(SizeAlign::new(size, elem.align))
    }

    fn struct_layout(&mut self, ty: TypeId, def: &StructDef) -> Result<Layout, LayoutError> {
        self.enter(ty)?;
        let result = self.place_fields(ty, def);
        self.leave();
        result
    }

    fn place_fields(&mut self, ty: TypeId, def: &StructDef) -> Result<Layout, LayoutError> {
        let mut shapes = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            shapes.push(self.size_align(field.ty)?);
        }

        let layout = Layout::sequential(shapes).ok_or_else(|| self.overflow(ty))?;

        if tracing::enabled!(tracing::Level::TRACE) {
            for (field, slot) in def.fields.iter().zip(layout.fields()) {
                tracing::trace!(
                    owner = %self.registry.display(ty),
                    field = %field.name,
                    offset = slot.offset,
                    size = slot.size,
                    align = slot.align,
                    "placed field"
                );
            }
        }
        Ok(layout)
    }

    /// Push `ty` onto the in-progress stack, failing if it is already there.
    fn enter(&mut self, ty: TypeId) -> Result<(), LayoutError> {
        if let Some(pos) = self.in_progress.iter().position(|&t| t == ty) {
            let mut cycle: Vec<String> = self.in_progress[pos..]
                .iter()
                .map(|&t| self.registry.display(t))
                .collect();
            let name = self.registry.display(ty);
            cycle.push(name.clone());
            tracing::debug!(%name, cycle = ?cycle, "cyclic type");
            return Err(LayoutError::Cyclic { name, cycle });
        }
        self.in_progress.push(ty);
        Ok(())
    }

    fn leave(&mut self) {
        self.in_progress.pop();
    }

    fn overflow(&self, ty: TypeId) -> LayoutError {
        LayoutError::Overflow {
            name: self.registry.display(ty),
        }
    }
}
