use std::sync::Arc;

use crate::key::{Qualifier, TypeRef, TypedQualifier};
use crate::method::{MethodDescriptor, MethodHandle, MethodMarker, Parameter, ParameterMarker};

/// Starts describing a parameter of declared type `T`.
///
/// # Examples
///
/// ```rust
/// # use disposal::method::param;
/// # trait Gadget {}
/// # struct Widget;
/// let disposed = param::<Widget>().disposes().assignable_to::<dyn Gadget>();
/// let injected = param::<u32>().qualified_by("retries");
/// ```
pub fn param<T>() -> ParameterBuilder
where
    T: ?Sized + 'static,
{
    ParameterBuilder::new(TypeRef::of::<T>())
}

pub struct ParameterBuilder {
    ty: TypeRef,
    supertypes: Vec<TypeRef>,
    qualifiers: Vec<Box<dyn Qualifier>>,
    markers: Vec<ParameterMarker>,
}

impl ParameterBuilder {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            supertypes: Vec::new(),
            qualifiers: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Marks the parameter as the one receiving the disposed instance.
    pub fn disposes(self) -> Self {
        self.marked(ParameterMarker::Disposes)
    }

    pub fn observes(self) -> Self {
        self.marked(ParameterMarker::Observes)
    }

    pub fn marked(mut self, marker: ParameterMarker) -> Self {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    pub fn qualified_by<Q: TypedQualifier>(mut self, qualifier: Q) -> Self {
        self.qualifiers.push(Box::new(qualifier));
        self
    }

    /// Declares a supertype or contract the declared type is assignable to.
    pub fn assignable_to<T>(mut self) -> Self
    where
        T: ?Sized + 'static,
    {
        self.supertypes.push(TypeRef::of::<T>());
        self
    }

    /// Finishes the parameter at the given position.
    pub fn at(self, position: usize) -> Parameter {
        Parameter {
            position,
            ty: self.ty,
            supertypes: self.supertypes,
            qualifiers: self.qualifiers,
            markers: self.markers,
        }
    }
}

/// Builds a [`MethodDescriptor`], assigning parameter positions in the order
/// parameters are added.
pub struct MethodBuilder {
    name: String,
    parameters: Vec<Parameter>,
    markers: Vec<MethodMarker>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn parameter(mut self, parameter: ParameterBuilder) -> Self {
        let position = self.parameters.len();
        self.parameters.push(parameter.at(position));
        self
    }

    pub fn marked(mut self, marker: MethodMarker) -> Self {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    pub fn build<H: MethodHandle>(self, handle: H) -> MethodDescriptor {
        MethodDescriptor {
            name: self.name,
            parameters: self.parameters,
            markers: self.markers,
            handle: Arc::new(handle),
        }
    }
}
