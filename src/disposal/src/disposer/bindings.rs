use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::container::registry::QualifierMatcher;
use crate::key::{QualifierSet, TypeClosure, TypeRef};
use crate::method::Parameter;

/// The key a disposer is matched with against producer-created instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    ty: TypeRef,
    qualifiers: QualifierSet,
    types: TypeClosure,
}

impl Bindings {
    /// Derives the bindings from the disposed parameter.
    ///
    /// The qualifiers are the ones declared on the parameter, or `{Default}`
    /// if there are none. The type closure holds the declared type, every
    /// type the parameter is declared assignable to, and the universal
    /// supertype.
    pub fn compute(disposed: &Parameter) -> Self {
        Self {
            ty: disposed.ty(),
            qualifiers: disposed.qualifier_set(),
            types: disposed.type_closure(),
        }
    }

    /// The declared type of the disposed parameter.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn qualifiers(&self) -> &QualifierSet {
        &self.qualifiers
    }

    pub fn types(&self) -> &TypeClosure {
        &self.types
    }

    /// Returns true if an instance of type `ty` qualified by `qualifiers` can
    /// be disposed by the owner of these bindings.
    pub fn admits(
        &self,
        ty: TypeRef,
        qualifiers: &QualifierSet,
        matcher: &dyn QualifierMatcher,
    ) -> bool {
        self.types.contains(ty) && matcher.matches(&self.qualifiers, qualifiers)
    }
}

impl Display for Bindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.types, self.qualifiers)
    }
}
