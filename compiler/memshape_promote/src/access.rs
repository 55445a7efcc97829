//! Reading selectors from instances.

use memshape_types::TypeId;

use crate::selector::{SelectorEntry, SelectorError, SelectorTable, SelectorTarget};
use crate::value::Value;

/// Errors reading a selector from an instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("nil dereference at field path {at:?}")]
    NilReference { at: Vec<usize> },

    #[error("value does not have the shape of its type at field path {at:?}")]
    ShapeMismatch { at: Vec<usize> },
}

/// What a selector reads.
#[derive(Debug, PartialEq)]
pub enum Accessed<'v> {
    Field(&'v Value),
    /// Member `index` of `interface`, bound to the interface's dynamic value.
    Method {
        receiver: &'v Value,
        interface: TypeId,
        index: usize,
    },
}

impl<'v> Accessed<'v> {
    /// The field value, if this is a field.
    pub fn field(&self) -> Option<&'v Value> {
        match *self {
            Self::Field(value) => Some(value),
            Self::Method { .. } => None,
        }
    }
}

/// Follow `entry` through `value`, dereferencing pointers along the way.
///
/// Fails with [`AccessError::NilReference`] when the path passes through a
/// nil pointer, or when a method's interface value is nil.
pub fn access<'v>(value: &'v Value, entry: &SelectorEntry) -> Result<Accessed<'v>, AccessError> {
    let mut current = value;
    for (hop, &index) in entry.path.iter().enumerate() {
        let at = &entry.path[..hop];
        let fields = match deref(current, at)? {
            Value::Struct(fields) => fields,
            _ => return Err(shape_mismatch(at)),
        };
        current = fields.get(index).ok_or_else(|| shape_mismatch(&entry.path[..=hop]))?;
    }

    match entry.target {
        SelectorTarget::Field { .. } => Ok(Accessed::Field(current)),
        SelectorTarget::Method { interface, index } => match current {
            Value::Interface(Some(receiver)) => Ok(Accessed::Method {
                receiver,
                interface,
                index,
            }),
            Value::Interface(None) => Err(AccessError::NilReference {
                at: entry.path.to_vec(),
            }),
            _ => Err(shape_mismatch(&entry.path)),
        },
    }
}

/// Look `name` up in `table` and read it from `value`.
pub fn access_promoted<'v>(
    table: &SelectorTable,
    value: &'v Value,
    name: &str,
) -> Result<Accessed<'v>, AccessError> {
    let entry = table.lookup(name)?;
    access(value, entry)
}

fn deref<'v>(value: &'v Value, at: &[usize]) -> Result<&'v Value, AccessError> {
    match value {
        Value::Pointer(Some(pointee)) => Ok(pointee),
        Value::Pointer(None) => Err(AccessError::NilReference { at: at.to_vec() }),
        _ => Ok(value),
    }
}

fn shape_mismatch(at: &[usize]) -> AccessError {
    AccessError::ShapeMismatch { at: at.to_vec() }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Test code uses expect for clarity")]
mod tests;
