//! Explicit descriptors of disposer methods.
//!
//! A [`MethodDescriptor`] is what the container knows about a method: its
//! ordered [`Parameter`]s with their types, qualifiers and markers, the
//! markers on the method itself, and a [`MethodHandle`] to call it through.
//! Descriptors are built once, either by hand with [`MethodBuilder`] or by the
//! [`disposers`] attribute macro, and never change afterwards.
//!
//! [`disposers`]: crate::disposers

mod body;
mod builder;
mod handle;

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::Managed;
use crate::key::{Qualifier, QualifierSet, TypeClosure, TypeRef};

pub use body::{InstanceBody, InstanceMethod, StaticBody, StaticMethod};
pub use builder::{param, MethodBuilder, ParameterBuilder};
pub use handle::{Arguments, InvocationError, MethodHandle};

/// Markers a parameter can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterMarker {
    /// The parameter receives the instance being disposed.
    Disposes,
    /// The parameter receives an event, making the method an observer.
    Observes,
}

/// Markers the method itself can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodMarker {
    /// The method is an initializer called on injection.
    Initializer,
    /// The method is a producer.
    Produces,
}

/// One declared parameter of a method, i.e. an injection point unless it is
/// the disposed parameter.
pub struct Parameter {
    position: usize,
    ty: TypeRef,
    supertypes: Vec<TypeRef>,
    qualifiers: Vec<Box<dyn Qualifier>>,
    markers: Vec<ParameterMarker>,
}

impl Parameter {
    pub fn position(&self) -> usize {
        self.position
    }

    /// The declared type.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    /// The declared qualifiers, which may be empty.
    pub fn qualifiers(&self) -> impl Iterator<Item = &dyn Qualifier> {
        self.qualifiers.iter().map(AsRef::as_ref)
    }

    /// The declared qualifiers, or `{Default}` if there are none.
    pub fn qualifier_set(&self) -> QualifierSet {
        QualifierSet::from_declared(self.qualifiers())
    }

    /// Every type the declared type is assignable to, including itself and
    /// the universal supertype.
    pub fn type_closure(&self) -> TypeClosure {
        TypeClosure::new(self.ty, self.supertypes.iter().copied())
    }

    pub fn is_marked(&self, marker: ParameterMarker) -> bool {
        self.markers.contains(&marker)
    }

    pub fn is_disposed(&self) -> bool {
        self.is_marked(ParameterMarker::Disposes)
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{} {}", self.position, self.ty)?;
        if !self.qualifiers.is_empty() {
            write!(f, " {}", self.qualifier_set())?;
        }
        Ok(())
    }
}

impl Debug for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Parameter")
            .field("position", &self.position)
            .field("ty", &self.ty)
            .field("qualifiers", &self.qualifiers)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// A method name together with its parameter types, which is what a
/// business interface exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    name: String,
    parameter_types: Vec<TypeRef>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, parameter_types: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            parameter_types,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_types(&self) -> &[TypeRef] {
        &self.parameter_types
    }
}

impl Display for MethodSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let types: Vec<_> = self.parameter_types.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.name, types.join(", "))
    }
}

pub struct MethodDescriptor {
    name: String,
    parameters: Vec<Parameter>,
    markers: Vec<MethodMarker>,
    handle: Arc<dyn MethodHandle>,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameters_marked(&self, marker: ParameterMarker) -> Vec<&Parameter> {
        self.parameters
            .iter()
            .filter(|parameter| parameter.is_marked(marker))
            .collect()
    }

    pub fn is_marked(&self, marker: MethodMarker) -> bool {
        self.markers.contains(&marker)
    }

    pub fn signature(&self) -> MethodSignature {
        let types = self.parameters.iter().map(Parameter::ty).collect();
        MethodSignature::new(self.name.clone(), types)
    }

    pub fn handle(&self) -> &dyn MethodHandle {
        self.handle.as_ref()
    }
}

impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.signature(), f)
    }
}

impl Debug for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// A component type that declares disposer methods.
///
/// Usually implemented by the [`disposers`] attribute macro.
///
/// [`disposers`]: crate::disposers
pub trait Disposers: Managed + Sized {
    fn disposal_methods() -> Vec<MethodDescriptor>;
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    trait Gadget {}

    struct Widget;

    struct AuditLog;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Pool {
        Primary,
    }

    fn make_descriptor() -> MethodDescriptor {
        MethodBuilder::new("dispose")
            .parameter(param::<Widget>().disposes().assignable_to::<dyn Gadget>())
            .parameter(param::<AuditLog>().qualified_by("audit"))
            .parameter(param::<u32>().qualified_by(Pool::Primary).observes())
            .build(StaticMethod::new(|_: Widget, _: AuditLog, _: u32| {
                Ok::<_, Infallible>(())
            }))
    }

    #[test]
    fn descriptor_exposes_parameters_in_declaration_order() {
        let descriptor = make_descriptor();
        let positions: Vec<_> = descriptor.parameters().iter().map(Parameter::position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(descriptor.parameters()[1].ty(), TypeRef::of::<AuditLog>());
    }

    #[test]
    fn descriptor_filters_parameters_by_marker() {
        let descriptor = make_descriptor();
        let disposed = descriptor.parameters_marked(ParameterMarker::Disposes);
        assert_eq!(disposed.len(), 1);
        assert_eq!(disposed[0].position(), 0);

        let observed = descriptor.parameters_marked(ParameterMarker::Observes);
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].position(), 2);
        assert!(!descriptor.is_marked(MethodMarker::Produces));
    }

    #[test]
    fn descriptor_displays_signature() {
        let descriptor = make_descriptor();
        assert_eq!(descriptor.to_string(), "dispose(Widget, AuditLog, u32)");
        assert_eq!(
            descriptor.parameters()[1].to_string(),
            "#1 AuditLog {\"audit\"}"
        );
        assert_eq!(descriptor.parameters()[0].to_string(), "#0 Widget");
    }

    #[test]
    fn parameter_type_closure_includes_supplied_supertypes() {
        let descriptor = make_descriptor();
        let closure = descriptor.parameters()[0].type_closure();
        assert!(closure.contains(TypeRef::of::<Widget>()));
        assert!(closure.contains(TypeRef::of::<dyn Gadget>()));
        assert!(closure.contains(TypeRef::universal()));
    }

    #[test]
    fn descriptor_over_zero_parameters_is_constructible() {
        let descriptor =
            MethodBuilder::new("noop").build(StaticMethod::new(|| Ok::<_, Infallible>(())));
        assert!(descriptor.parameters().is_empty());
        assert_eq!(descriptor.to_string(), "noop()");
    }
}
