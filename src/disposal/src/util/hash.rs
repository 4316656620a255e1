use std::any::Any;
use std::hash::{Hash, Hasher};

/// Object-safe equality and hashing, so that heterogeneous qualifiers can
/// live in one hash set.
pub trait DynHash: Any {
    fn dyn_eq(&self, other: &dyn Any) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Eq + Hash + 'static> DynHash for T {
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        // Values of different types must not collide just because their
        // payloads hash alike.
        self.type_id().hash(&mut state);
        self.hash(&mut state);
    }
}
