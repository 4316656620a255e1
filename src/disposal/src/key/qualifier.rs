use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use crate::util::any::AsAny;
use crate::util::hash::DynHash;

/// A type-erased qualifier used to tell apart instances of the same type.
///
/// Any value satisfying [`TypedQualifier`] is a [`Qualifier`], so plain names
/// (`"audit"`), enum variants and unit structs can all be used directly.
pub trait Qualifier: Debug + AsAny + DynHash + Send + Sync + 'static {
    fn dyn_clone(&self) -> Box<dyn Qualifier>;
}

impl PartialEq for dyn Qualifier {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn Qualifier {}

impl Hash for dyn Qualifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

pub trait TypedQualifier: Copy + Debug + Eq + Hash + Send + Sync + 'static {}

impl<T> TypedQualifier for T where T: Copy + Debug + Eq + Hash + Send + Sync + 'static {}

impl<T: TypedQualifier> Qualifier for T {
    fn dyn_clone(&self) -> Box<dyn Qualifier> {
        Box::new(*self)
    }
}

/// The implicit qualifier of anything declared without qualifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultQualifier;

impl Debug for DefaultQualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("Default")
    }
}

/// A set of qualifiers. A set built from no qualifiers at all is never empty:
/// it holds the [`DefaultQualifier`] instead.
pub struct QualifierSet {
    qualifiers: HashSet<Box<dyn Qualifier>>,
}

impl QualifierSet {
    pub fn default_set() -> Self {
        Self::from_iter([Box::new(DefaultQualifier) as Box<dyn Qualifier>])
    }

    /// Builds a set from declared qualifiers, falling back to
    /// [`QualifierSet::default_set`] when there are none.
    pub fn from_declared<'a, I>(declared: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn Qualifier>,
    {
        let qualifiers: HashSet<_> = declared.into_iter().map(|q| q.dyn_clone()).collect();
        if qualifiers.is_empty() {
            Self::default_set()
        } else {
            Self { qualifiers }
        }
    }

    pub fn of<Q: TypedQualifier>(qualifier: Q) -> Self {
        Self::from_iter([Box::new(qualifier) as Box<dyn Qualifier>])
    }

    pub fn with<Q: TypedQualifier>(mut self, qualifier: Q) -> Self {
        self.qualifiers.insert(Box::new(qualifier));
        self
    }

    pub fn contains(&self, qualifier: &dyn Qualifier) -> bool {
        self.qualifiers.contains(qualifier)
    }

    pub fn is_default(&self) -> bool {
        self.qualifiers.len() == 1 && self.contains(&DefaultQualifier)
    }

    pub fn is_subset(&self, other: &QualifierSet) -> bool {
        self.iter().all(|q| other.contains(q))
    }

    pub fn len(&self) -> usize {
        self.qualifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qualifiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Qualifier> {
        self.qualifiers.iter().map(AsRef::as_ref)
    }
}

impl FromIterator<Box<dyn Qualifier>> for QualifierSet {
    fn from_iter<T: IntoIterator<Item = Box<dyn Qualifier>>>(iter: T) -> Self {
        Self {
            qualifiers: iter.into_iter().collect(),
        }
    }
}

impl Clone for QualifierSet {
    fn clone(&self) -> Self {
        self.iter().map(Qualifier::dyn_clone).collect()
    }
}

impl PartialEq for QualifierSet {
    fn eq(&self, other: &Self) -> bool {
        self.qualifiers == other.qualifiers
    }
}

impl Eq for QualifierSet {}

impl Debug for QualifierSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for QualifierSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut names: Vec<_> = self.iter().map(|q| format!("{q:?}")).collect();
        names.sort();
        write!(f, "{{{}}}", names.join(", "))
    }
}
