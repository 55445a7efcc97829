//! Selector tables: what a bare name means on a struct.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use memshape_types::TypeId;

/// Field indices from the outer struct inward.
pub type SelectorPath = SmallVec<[usize; 4]>;

/// What a selector reaches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SelectorTarget {
    /// The field at the end of the path, of type `ty`.
    Field { ty: TypeId },
    /// Member `index` of `interface`. The path ends at the interface value
    /// that carries the receiver.
    Method { interface: TypeId, index: usize },
}

/// One way to reach a name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectorEntry {
    pub path: SelectorPath,
    /// Embedding hops; 0 for directly declared fields.
    pub depth: usize,
    pub target: SelectorTarget,
    /// The path dereferences a pointer before reaching its target, so
    /// access can fail at run time with a nil reference.
    pub through_pointer: bool,
}

/// Resolution of a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Resolved(SelectorEntry),
    /// More than one candidate at the shallowest depth. Only a qualified
    /// path can reach any of them.
    Ambiguous(Vec<SelectorEntry>),
}

impl Selector {
    /// Depth at which the name was decided.
    pub fn depth(&self) -> usize {
        match self {
            Self::Resolved(entry) => entry.depth,
            Self::Ambiguous(entries) => entries.first().map_or(0, |entry| entry.depth),
        }
    }

    #[inline]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }
}

/// Errors using a bare selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("ambiguous selector `{owner}.{name}`: {candidates} candidates at depth {depth}")]
    Ambiguous {
        owner: String,
        name: String,
        depth: usize,
        candidates: usize,
    },

    #[error("`{owner}` has no field or method `{name}`")]
    Unknown { owner: String, name: String },
}

/// Name → selector table for one struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorTable {
    owner: TypeId,
    owner_name: String,
    entries: BTreeMap<String, Selector>,
}

impl SelectorTable {
    pub(crate) fn new(owner: TypeId, owner_name: String, entries: BTreeMap<String, Selector>) -> Self {
        Self {
            owner,
            owner_name,
            entries,
        }
    }

    #[inline]
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Selector> {
        self.entries.get(name)
    }

    /// The unique entry for a bare name.
    pub fn lookup(&self, name: &str) -> Result<&SelectorEntry, SelectorError> {
        match self.entries.get(name) {
            Some(Selector::Resolved(entry)) => Ok(entry),
            Some(Selector::Ambiguous(entries)) => Err(SelectorError::Ambiguous {
                owner: self.owner_name.clone(),
                name: name.to_owned(),
                depth: entries.first().map_or(0, |entry| entry.depth),
                candidates: entries.len(),
            }),
            None => Err(SelectorError::Unknown {
                owner: self.owner_name.clone(),
                name: name.to_owned(),
            }),
        }
    }

    /// All names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selector)> {
        self.entries.iter().map(|(name, selector)| (name.as_str(), selector))
    }

    /// Names reached through embedding (depth > 0).
    pub fn promoted(&self) -> impl Iterator<Item = (&str, &Selector)> {
        self.iter().filter(|(_, selector)| selector.depth() > 0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
