//! Struct instances for selector access.
//!
//! A `Value` mirrors a type's shape: structs hold their fields in
//! declaration order and pointers either own their pointee or are nil.

use rustc_hash::FxHashSet;

use memshape_types::{ensure_sufficient_stack, PrimitiveKind, TypeId, TypeKind, TypeRegistry};

/// Most array elements and struct fields one zero value may hold, counted
/// across every nesting level.
pub const MAX_ZERO_ELEMENTS: u64 = 1 << 16;

/// An instance of a registered type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex(f64, f64),
    Str(String),
    /// `[]T`, including `[]byte`.
    Slice(Vec<Value>),
    Array(Vec<Value>),
    Struct(Vec<Value>),
    /// `None` is a nil pointer.
    Pointer(Option<Box<Value>>),
    /// The dynamic value; `None` is a nil interface.
    Interface(Option<Box<Value>>),
    /// A nil map, channel or function.
    Nil,
}

/// Errors building zero values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("no type with id {0:?} in this registry")]
    UnknownTypeId(TypeId),

    #[error("type `{name}` is declared but never defined")]
    Incomplete { name: String },

    #[error("type `{name}` contains itself without indirection")]
    Cyclic { name: String },

    #[error("zero value of `{name}` is too large to build")]
    TooLarge { name: String },
}

impl Value {
    /// The zero value of `ty`: false, 0, "", empty slices and nil pointers,
    /// with structs and arrays zeroed element by element.
    pub fn zero(registry: &TypeRegistry, ty: TypeId) -> Result<Self, ValueError> {
        ZeroBuilder {
            registry,
            root: ty,
            budget: MAX_ZERO_ELEMENTS,
            in_progress: FxHashSet::default(),
        }
        .build(ty)
    }

    /// A non-nil pointer to `value`.
    pub fn pointer_to(value: Value) -> Self {
        Self::Pointer(Some(Box::new(value)))
    }

    /// An interface holding `value`.
    pub fn interface_of(value: Value) -> Self {
        Self::Interface(Some(Box::new(value)))
    }

    /// Field `index` of a struct value.
    pub fn field(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.get(index),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut Value> {
        match self {
            Self::Struct(fields) => fields.get_mut(index),
            _ => None,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Pointer(None) | Self::Interface(None) | Self::Nil)
    }
}

struct ZeroBuilder<'a> {
    registry: &'a TypeRegistry,
    root: TypeId,
    /// Elements and fields still allowed before the value is too large.
    budget: u64,
    /// Struct and array types being built; a repeat means the type
    /// contains itself by value.
    in_progress: FxHashSet<TypeId>,
}

impl ZeroBuilder<'_> {
    fn build(&mut self, ty: TypeId) -> Result<Value, ValueError> {
        let registry = self.registry;
        let kind = registry.kind(ty).ok_or(ValueError::UnknownTypeId(ty))?;
        let value = match kind {
            TypeKind::Primitive(kind) => zero_primitive(*kind),
            TypeKind::String => Value::Str(String::new()),
            TypeKind::Slice(_) => Value::Slice(Vec::new()),
            TypeKind::Pointer(_) => Value::Pointer(None),
            TypeKind::Interface(_) => Value::Interface(None),
            TypeKind::Map { .. } | TypeKind::Chan(_) | TypeKind::Func => Value::Nil,
            TypeKind::Declared => {
                return Err(ValueError::Incomplete {
                    name: registry.display(ty),
                })
            }
            TypeKind::Array { elem, count } => {
                let (elem, count) = (*elem, *count);
                self.charge(count)?;
                self.nested(ty, |this| {
                    (0..count).map(|_| this.build(elem)).collect::<Result<Vec<_>, _>>()
                })
                .map(Value::Array)?
            }
            TypeKind::Struct(def) => {
                self.charge(def.fields.len() as u64)?;
                self.nested(ty, |this| def.fields.iter().map(|field| this.build(field.ty)).collect())
                    .map(Value::Struct)?
            }
        };
        Ok(value)
    }

    fn charge(&mut self, count: u64) -> Result<(), ValueError> {
        self.budget = self.budget.checked_sub(count).ok_or_else(|| ValueError::TooLarge {
            name: self.registry.display(self.root),
        })?;
        Ok(())
    }

    fn nested<T>(
        &mut self,
        ty: TypeId,
        f: impl FnOnce(&mut Self) -> Result<T, ValueError>,
    ) -> Result<T, ValueError> {
        if !self.in_progress.insert(ty) {
            return Err(ValueError::Cyclic {
                name: self.registry.display(ty),
            });
        }
        let result = ensure_sufficient_stack(|| f(self));
        self.in_progress.remove(&ty);
        result
    }
}

fn zero_primitive(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Bool => Value::Bool(false),
        PrimitiveKind::Int8
        | PrimitiveKind::Int16
        | PrimitiveKind::Int32
        | PrimitiveKind::Int64
        | PrimitiveKind::Int => Value::Int(0),
        PrimitiveKind::Uint8
        | PrimitiveKind::Uint16
        | PrimitiveKind::Uint32
        | PrimitiveKind::Uint64
        | PrimitiveKind::Uint
        | PrimitiveKind::Uintptr => Value::Uint(0),
        PrimitiveKind::Float32 | PrimitiveKind::Float64 => Value::Float(0.0),
        PrimitiveKind::Complex64 | PrimitiveKind::Complex128 => Value::Complex(0.0, 0.0),
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Test code uses expect for clarity")]
mod tests;
