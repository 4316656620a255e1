mod qualifier;

use std::any::{self, TypeId};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use crate::container::Managed;
use crate::util::name;

pub use qualifier::{DefaultQualifier, Qualifier, QualifierSet, TypedQualifier};

/// The identity of a Rust type as seen by the container.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// The supertype of everything the container manages.
    pub fn universal() -> Self {
        Self::of::<dyn Managed>()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialOrd for TypeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl Debug for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&name::abbreviate(self.name))
    }
}

/// The set of types an instance is considered assignable to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClosure {
    types: BTreeSet<TypeRef>,
}

impl TypeClosure {
    /// Builds the closure of `declared` given its metadata-supplied
    /// supertypes. The universal supertype is always a member.
    pub fn new<I>(declared: TypeRef, supertypes: I) -> Self
    where
        I: IntoIterator<Item = TypeRef>,
    {
        let mut types: BTreeSet<_> = supertypes.into_iter().collect();
        types.insert(declared);
        types.insert(TypeRef::universal());
        Self { types }
    }

    pub fn contains(&self, ty: TypeRef) -> bool {
        self.types.contains(&ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.types.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Display for TypeClosure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let names: Vec<_> = self.iter().map(|ty| ty.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
