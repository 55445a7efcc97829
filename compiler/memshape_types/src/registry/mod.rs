//! Registry of type descriptors.
//!
//! The `TypeRegistry` owns every type definition and hands out [`TypeId`]
//! handles. Fields refer to their types by id, so one definition is shared
//! by every field that uses it.
//!
//! # Identity
//!
//! - Primitives, `string` and `[]byte` have fixed ids (see [`TypeId`]).
//! - Anonymous composites (`*T`, `[]T`, `[N]T`, `map[K]V`, `chan T`,
//!   `func`) are interned structurally: asking twice yields the same id.
//! - Structs and interfaces are nominal: every declaration is a new id.
//!
//! # Definition order
//!
//! Structs are declared first and defined later so that a struct can
//! mention itself (`Node { Left *Node }`). A registry is built once and
//! then frozen (typically behind an `Arc`); nothing downstream mutates it.

use rustc_hash::FxHashMap;

use crate::id::TypeId;
use crate::primitive::{PrimitiveKind, UnknownPrimitiveKind};

/// Registry of all type definitions for one program.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    /// Entries indexed by `TypeId`.
    entries: Vec<TypeEntry>,

    /// Named types (structs, interfaces) by name.
    by_name: FxHashMap<String, TypeId>,

    /// Structural interning for anonymous composite kinds.
    interned: FxHashMap<TypeKind, TypeId>,
}

/// A registered type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeEntry {
    /// Declared name; `None` for anonymous composites.
    pub name: Option<String>,

    pub kind: TypeKind,
}

/// Shape of a type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    String,
    Pointer(TypeId),
    /// Dynamic sequence (`[]T`); `[]byte` is `Slice(TypeId::UINT8)`.
    Slice(TypeId),
    Array {
        elem: TypeId,
        count: u64,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan(TypeId),
    Func,
    Interface(InterfaceDef),
    Struct(StructDef),
    /// A struct that has been declared but not yet defined.
    Declared,
}

/// Ordered fields of a struct.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
}

/// Declared members of an interface.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InterfaceDef {
    pub methods: Vec<String>,
}

/// One struct field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    /// Field name. For embedded fields this is the type's own name.
    pub name: String,

    pub ty: TypeId,

    /// Embedded fields supply promotion candidates to the outer struct.
    pub embedded: bool,
}

impl FieldDef {
    /// An ordinary named field.
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
        }
    }
}

/// Errors raised while defining types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error(transparent)]
    UnknownPrimitiveKind(#[from] UnknownPrimitiveKind),

    #[error("type `{name}` is already declared")]
    DuplicateType { name: String },

    #[error("no type with id {0:?} in this registry")]
    UnknownTypeId(TypeId),

    #[error("type `{name}` is not a struct")]
    NotAStruct { name: String },

    #[error("struct `{name}` is already defined")]
    AlreadyDefined { name: String },

    #[error("field `{field}` declared more than once in `{owner}`")]
    DuplicateField { owner: String, field: String },

    #[error("method `{method}` declared more than once in `{owner}`")]
    DuplicateMethod { owner: String, method: String },

    #[error("type `{ty}` cannot be embedded: embedded fields must name a type or a pointer to a non-interface named type")]
    InvalidEmbed { ty: String },
}

impl TypeRegistry {
    /// Create a registry holding only the built-in types.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(64),
            by_name: FxHashMap::default(),
            interned: FxHashMap::default(),
        };

        for kind in PrimitiveKind::ALL {
            registry.push(None, TypeKind::Primitive(kind));
        }
        let string = registry.push(None, TypeKind::String);
        debug_assert_eq!(string, TypeId::STRING);
        let bytes = registry.intern(TypeKind::Slice(TypeId::UINT8));
        debug_assert_eq!(bytes, TypeId::BYTES);

        registry
    }

    fn push(&mut self, name: Option<String>, kind: TypeKind) -> TypeId {
        let id = TypeId::from_raw(
            u32::try_from(self.entries.len()).unwrap_or(u32::MAX),
        );
        self.entries.push(TypeEntry { name, kind });
        id
    }

    fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let id = self.push(None, kind.clone());
        self.interned.insert(kind, id);
        id
    }

    fn claim_name(&self, name: &str) -> Result<(), TypeError> {
        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateType {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    // === Built-in and anonymous types ===

    /// Id of a primitive by source name (`byte` and `rune` included).
    pub fn primitive_named(&self, name: &str) -> Result<TypeId, TypeError> {
        Ok(TypeId::of_primitive(PrimitiveKind::from_name(name)?))
    }

    pub fn pointer(&mut self, to: TypeId) -> TypeId {
        self.intern(TypeKind::Pointer(to))
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.intern(TypeKind::Slice(elem))
    }

    pub fn array(&mut self, elem: TypeId, count: u64) -> TypeId {
        self.intern(TypeKind::Array { elem, count })
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeKind::Map { key, value })
    }

    pub fn chan(&mut self, elem: TypeId) -> TypeId {
        self.intern(TypeKind::Chan(elem))
    }

    pub fn func(&mut self) -> TypeId {
        self.intern(TypeKind::Func)
    }

    // === Named types ===

    /// Declare a struct without fields. Define it later with
    /// [`define_struct`](Self::define_struct).
    pub fn declare_struct(&mut self, name: impl Into<String>) -> Result<TypeId, TypeError> {
        let name = name.into();
        self.claim_name(&name)?;
        let id = self.push(Some(name.clone()), TypeKind::Declared);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Give a declared struct its fields. A struct is defined exactly once.
    pub fn define_struct(&mut self, id: TypeId, fields: Vec<FieldDef>) -> Result<(), TypeError> {
        let owner = self.display(id);
        match self.kind(id) {
            None => return Err(TypeError::UnknownTypeId(id)),
            Some(TypeKind::Declared) => {}
            Some(TypeKind::Struct(_)) => return Err(TypeError::AlreadyDefined { name: owner }),
            Some(_) => return Err(TypeError::NotAStruct { name: owner }),
        }

        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|earlier| earlier.name == field.name) {
                return Err(TypeError::DuplicateField {
                    owner,
                    field: field.name.clone(),
                });
            }
            if field.embedded && self.embedded_name(field.ty).as_deref() != Some(&field.name) {
                return Err(TypeError::InvalidEmbed {
                    ty: self.display(field.ty),
                });
            }
        }

        tracing::trace!(name = %owner, fields = fields.len(), "struct defined");
        self.entries[id.index()].kind = TypeKind::Struct(StructDef { fields });
        Ok(())
    }

    /// Declare and define a struct in one step.
    pub fn add_struct(
        &mut self,
        name: impl Into<String>,
        fields: Vec<FieldDef>,
    ) -> Result<TypeId, TypeError> {
        let id = self.declare_struct(name)?;
        self.define_struct(id, fields)?;
        Ok(id)
    }

    /// Register an interface with its member names.
    pub fn add_interface<I, S>(&mut self, name: impl Into<String>, methods: I) -> Result<TypeId, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        self.claim_name(&name)?;

        let mut def = InterfaceDef::default();
        for method in methods {
            let method = method.into();
            if def.methods.contains(&method) {
                return Err(TypeError::DuplicateMethod {
                    owner: name,
                    method,
                });
            }
            def.methods.push(method);
        }

        let id = self.push(Some(name.clone()), TypeKind::Interface(def));
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// An embedded field of type `ty`, named after the type.
    ///
    /// `T` and `*T` are both named `T`. Unnamed types, pointers to pointers
    /// and pointers to interfaces cannot be embedded.
    pub fn embed(&self, ty: TypeId) -> Result<FieldDef, TypeError> {
        let name = self
            .embedded_name(ty)
            .ok_or_else(|| TypeError::InvalidEmbed {
                ty: self.display(ty),
            })?;
        Ok(FieldDef {
            name,
            ty,
            embedded: true,
        })
    }

    fn embedded_name(&self, ty: TypeId) -> Option<String> {
        let entry = self.get(ty)?;
        match &entry.kind {
            TypeKind::Pointer(to) => {
                let pointee = self.get(*to)?;
                match pointee.kind {
                    TypeKind::Pointer(_) | TypeKind::Interface(_) => None,
                    _ => Self::type_name(pointee),
                }
            }
            _ => Self::type_name(entry),
        }
    }

    /// The name a type is referred to by, if it has one.
    fn type_name(entry: &TypeEntry) -> Option<String> {
        match &entry.kind {
            TypeKind::Primitive(kind) => Some(kind.name().to_owned()),
            TypeKind::String => Some("string".to_owned()),
            TypeKind::Struct(_) | TypeKind::Interface(_) | TypeKind::Declared => entry.name.clone(),
            _ => None,
        }
    }

    // === Lookup ===

    #[inline]
    pub fn get(&self, id: TypeId) -> Option<&TypeEntry> {
        self.entries.get(id.index())
    }

    #[inline]
    pub fn kind(&self, id: TypeId) -> Option<&TypeKind> {
        self.get(id).map(|entry| &entry.kind)
    }

    /// Look up a named type.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Fields of a defined struct.
    pub fn struct_def(&self, id: TypeId) -> Option<&StructDef> {
        match self.kind(id)? {
            TypeKind::Struct(def) => Some(def),
            _ => None,
        }
    }

    pub fn interface_def(&self, id: TypeId) -> Option<&InterfaceDef> {
        match self.kind(id)? {
            TypeKind::Interface(def) => Some(def),
            _ => None,
        }
    }

    /// Defined structs, in declaration order.
    pub fn structs(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| matches!(entry.kind, TypeKind::Struct(_)))
            .filter_map(|(i, _)| u32::try_from(i).ok().map(TypeId::from_raw))
    }

    /// Human-readable type expression (`*Metadata`, `[4]Point`, `[]byte`).
    pub fn display(&self, id: TypeId) -> String {
        let Some(entry) = self.get(id) else {
            return format!("<invalid {}>", id.raw());
        };
        if let Some(name) = &entry.name {
            return name.clone();
        }
        match &entry.kind {
            TypeKind::Primitive(kind) => kind.name().to_owned(),
            TypeKind::String => "string".to_owned(),
            TypeKind::Slice(elem) if *elem == TypeId::UINT8 => "[]byte".to_owned(),
            TypeKind::Pointer(to) => format!("*{}", self.display(*to)),
            TypeKind::Slice(elem) => format!("[]{}", self.display(*elem)),
            TypeKind::Array { elem, count } => format!("[{count}]{}", self.display(*elem)),
            TypeKind::Map { key, value } => {
                format!("map[{}]{}", self.display(*key), self.display(*value))
            }
            TypeKind::Chan(elem) => format!("chan {}", self.display(*elem)),
            TypeKind::Func => "func()".to_owned(),
            TypeKind::Interface(_) => "interface{}".to_owned(),
            TypeKind::Struct(_) | TypeKind::Declared => "struct{}".to_owned(),
        }
    }

    /// Number of registered types, built-ins included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: built-ins are registered at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeKind {
    #[inline]
    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        matches!(self, Self::Interface(_))
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Test code uses expect for clarity")]
mod tests;
