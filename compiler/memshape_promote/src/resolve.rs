//! Promotion resolution.
//!
//! Selectors are resolved breadth-first by embedding depth. Level 0 holds
//! the struct's own fields; level `n + 1` holds the members of every type
//! embedded at level `n`. The first level that mentions a name decides it:
//! one candidate there resolves the name, several make it ambiguous, and
//! deeper candidates are shadowed either way.
//!
//! A type is expanded at most once, at the shallowest level it appears.
//! Reaching it again deeper would only find shadowed names, and skipping it
//! is what makes `Node { *Node }` terminate. A type embedded several times
//! at the same level is expanded once, carrying every route to it, so each
//! name it supplies has one candidate per route and is ambiguous.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use memshape_types::{TypeId, TypeKind, TypeRegistry};

use crate::selector::{Selector, SelectorEntry, SelectorError, SelectorPath, SelectorTable, SelectorTarget};

/// Errors building selector tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no type with id {0:?} in this registry")]
    UnknownTypeId(TypeId),

    #[error("type `{name}` is not a struct")]
    NotAStruct { name: String },

    #[error("selector path `{path}` has an empty segment")]
    EmptySegment { path: String },

    #[error("`{name}` is a method of `{interface}` and has no members")]
    MethodHasNoMembers { interface: String, name: String },

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Most routes kept per embedded type. Two already make every name the
/// type supplies ambiguous; the cap bounds diamond-shaped embeddings.
const MAX_ROUTES: usize = 16;

/// One way of reaching an embedded type from the root.
#[derive(Clone)]
struct Route {
    path: SelectorPath,
    through_pointer: bool,
}

impl Route {
    fn child(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            path,
            through_pointer: self.through_pointer,
        }
    }
}

/// A type whose members are candidates at the current level, with every
/// route that reaches it there.
struct Embedded {
    ty: TypeId,
    routes: SmallVec<[Route; 1]>,
}

/// Build the selector table for struct `ty`.
#[tracing::instrument(level = "debug", skip(registry))]
pub fn resolve_selectors(registry: &TypeRegistry, ty: TypeId) -> Result<SelectorTable, ResolveError> {
    match registry.kind(ty) {
        Some(TypeKind::Struct(_)) => {}
        Some(_) => {
            return Err(ResolveError::NotAStruct {
                name: registry.display(ty),
            })
        }
        None => return Err(ResolveError::UnknownTypeId(ty)),
    }

    let mut table: BTreeMap<String, Selector> = BTreeMap::new();
    let mut seen: FxHashSet<TypeId> = FxHashSet::default();
    let mut current = vec![Embedded {
        ty,
        routes: smallvec::smallvec![Route {
            path: SmallVec::new(),
            through_pointer: false,
        }],
    }];
    let mut depth = 0;

    while !current.is_empty() {
        let mut level: BTreeMap<&str, Vec<SelectorEntry>> = BTreeMap::new();
        let mut next = Vec::new();

        for embedded in &current {
            match registry.kind(embedded.ty) {
                Some(TypeKind::Struct(def)) => {
                    for (index, field) in def.fields.iter().enumerate() {
                        let routes: SmallVec<[Route; 1]> =
                            embedded.routes.iter().map(|route| route.child(index)).collect();

                        if field.embedded {
                            if let Some((inner, via_pointer)) = promotable(registry, field.ty) {
                                next.push(Embedded {
                                    ty: inner,
                                    routes: routes
                                        .iter()
                                        .map(|route| Route {
                                            path: route.path.clone(),
                                            through_pointer: route.through_pointer || via_pointer,
                                        })
                                        .collect(),
                                });
                            }
                        }

                        let target = SelectorTarget::Field { ty: field.ty };
                        level
                            .entry(field.name.as_str())
                            .or_default()
                            .extend(routes.into_iter().map(|route| SelectorEntry {
                                path: route.path,
                                depth,
                                target,
                                through_pointer: route.through_pointer,
                            }));
                    }
                }
                Some(TypeKind::Interface(def)) => {
                    for (index, method) in def.methods.iter().enumerate() {
                        let target = SelectorTarget::Method {
                            interface: embedded.ty,
                            index,
                        };
                        level
                            .entry(method.as_str())
                            .or_default()
                            .extend(embedded.routes.iter().map(|route| SelectorEntry {
                                path: route.path.clone(),
                                depth,
                                target,
                                through_pointer: route.through_pointer,
                            }));
                    }
                }
                _ => {}
            }
        }

        for (name, mut entries) in level {
            if table.contains_key(name) {
                continue;
            }
            let selector = if entries.len() == 1 {
                match entries.pop() {
                    Some(entry) => Selector::Resolved(entry),
                    None => continue,
                }
            } else {
                tracing::trace!(name, depth, candidates = entries.len(), "ambiguous selector");
                Selector::Ambiguous(entries)
            };
            table.insert(name.to_owned(), selector);
        }

        seen.extend(current.iter().map(|embedded| embedded.ty));
        current = consolidate(next, &seen);
        depth += 1;
    }

    tracing::debug!(names = table.len(), levels = depth, "selectors resolved");
    Ok(SelectorTable::new(ty, registry.display(ty), table))
}

/// Resolve a dotted path such as `Trackable.CreatedAt`.
///
/// Each segment is looked up with the promotion rules on the struct the
/// previous segment reached, following pointer fields. Segments must be
/// unambiguous where they are used.
pub fn resolve_path(registry: &TypeRegistry, ty: TypeId, path: &str) -> Result<SelectorEntry, ResolveError> {
    let mut owner = ty;
    let mut resolved: Option<SelectorEntry> = None;

    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(ResolveError::EmptySegment {
                path: path.to_owned(),
            });
        }

        let mut crosses_pointer = false;
        if let Some(previous) = &resolved {
            match previous.target {
                SelectorTarget::Field { ty } => {
                    let (inner, via_pointer) = member_owner(registry, ty).ok_or_else(|| ResolveError::NotAStruct {
                        name: registry.display(ty),
                    })?;
                    owner = inner;
                    crosses_pointer = via_pointer;
                }
                SelectorTarget::Method { interface, index } => {
                    let name = registry
                        .interface_def(interface)
                        .and_then(|def| def.methods.get(index))
                        .cloned()
                        .unwrap_or_default();
                    return Err(ResolveError::MethodHasNoMembers {
                        interface: registry.display(interface),
                        name,
                    });
                }
            }
        }

        let table = resolve_selectors(registry, owner)?;
        let entry = table.lookup(segment)?;

        resolved = Some(match resolved {
            None => entry.clone(),
            Some(mut joined) => {
                joined.path.extend(entry.path.iter().copied());
                joined.depth += entry.depth;
                joined.through_pointer |= crosses_pointer || entry.through_pointer;
                joined.target = entry.target;
                joined
            }
        });
    }

    resolved.ok_or_else(|| ResolveError::EmptySegment {
        path: path.to_owned(),
    })
}

/// The type whose members an embedded field of type `ty` promotes.
fn promotable(registry: &TypeRegistry, ty: TypeId) -> Option<(TypeId, bool)> {
    match registry.kind(ty)? {
        TypeKind::Struct(_) | TypeKind::Interface(_) => Some((ty, false)),
        TypeKind::Pointer(to) if registry.kind(*to)?.is_struct() => Some((*to, true)),
        _ => None,
    }
}

/// The struct a field of type `ty` exposes members of in a dotted path.
fn member_owner(registry: &TypeRegistry, ty: TypeId) -> Option<(TypeId, bool)> {
    match registry.kind(ty)? {
        TypeKind::Struct(_) => Some((ty, false)),
        TypeKind::Pointer(to) if registry.kind(*to)?.is_struct() => Some((*to, true)),
        _ => None,
    }
}

/// Drop types already expanded and merge repeats within the level,
/// keeping the routes of each repeat.
fn consolidate(next: Vec<Embedded>, seen: &FxHashSet<TypeId>) -> Vec<Embedded> {
    let mut first: FxHashMap<TypeId, usize> = FxHashMap::default();
    let mut out: Vec<Embedded> = Vec::with_capacity(next.len());
    for embedded in next {
        if seen.contains(&embedded.ty) {
            continue;
        }
        if let Some(&at) = first.get(&embedded.ty) {
            let routes = &mut out[at].routes;
            let room = MAX_ROUTES.saturating_sub(routes.len());
            routes.extend(embedded.routes.into_iter().take(room));
            continue;
        }
        first.insert(embedded.ty, out.len());
        out.push(embedded);
    }
    out
}
