use std::collections::{BTreeMap, HashMap};
use std::mem;
use std::sync::Arc;

use crate::disposer::{DisposalMethod, DisposerId};
use crate::key::TypeRef;

/// Validated disposers, by id and by every type of their type closure.
#[derive(Debug, Default)]
pub struct DisposerMap {
    by_id: BTreeMap<DisposerId, Arc<DisposalMethod>>,
    by_type: HashMap<TypeRef, DisposerSlot>,
}

impl DisposerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `method` unless a disposer with the same id exists, in which
    /// case `method` is handed back.
    pub fn insert(&mut self, method: DisposalMethod) -> Result<(), DisposalMethod> {
        if self.by_id.contains_key(method.id()) {
            return Err(method);
        }
        let method = Arc::new(method);
        for ty in method.bindings().types().iter() {
            self.by_type
                .entry(ty)
                .and_modify(|slot| slot.push(Arc::clone(&method)))
                .or_insert_with(|| Arc::clone(&method).into());
        }
        self.by_id.insert(method.id().clone(), method);
        Ok(())
    }

    pub fn get(&self, id: &DisposerId) -> Option<&Arc<DisposalMethod>> {
        self.by_id.get(id)
    }

    /// Disposers whose type closure contains `ty`, in registration order.
    pub fn candidates(&self, ty: TypeRef) -> &[Arc<DisposalMethod>] {
        self.by_type
            .get(&ty)
            .map(DisposerSlot::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DisposalMethod>> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Debug)]
enum DisposerSlot {
    Single(Arc<DisposalMethod>),
    Many(Vec<Arc<DisposalMethod>>),
}

impl DisposerSlot {
    fn push(&mut self, method: Arc<DisposalMethod>) {
        match self {
            Self::Single(_) => {
                let Self::Single(first) = mem::replace(self, Self::Many(Vec::with_capacity(2)))
                else {
                    unreachable!("`self` should match `Self::Single(_)`")
                };
                let Self::Many(methods) = self else {
                    unreachable!("`self` should already be assigned to `Self::Many(_)`")
                };
                methods.push(first);
                methods.push(method);
            }
            Self::Many(methods) => methods.push(method),
        }
    }

    fn as_slice(&self) -> &[Arc<DisposalMethod>] {
        match self {
            Self::Single(method) => std::slice::from_ref(method),
            Self::Many(methods) => methods,
        }
    }
}

impl From<Arc<DisposalMethod>> for DisposerSlot {
    fn from(method: Arc<DisposalMethod>) -> Self {
        Self::Single(method)
    }
}
