//! Disposer methods, from declaration to invocation.
//!
//! A [`DisposerCandidate`] pairs a [`MethodDescriptor`] with the component
//! declaring it. [`DisposerCandidate::validate`] checks its shape and derives
//! its [`Bindings`], yielding a [`DisposalMethod`], which is the only thing
//! that can be invoked.

mod bindings;
mod invoke;
mod receiver;
mod validate;

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::component::DeclaringComponent;
use crate::container::context::CreationalContext;
use crate::container::injector::{Injector, InjectorError};
use crate::container::registry::AmbiguousDisposer;
use crate::container::{Managed, Receiver};
use crate::method::{InvocationError, MethodDescriptor, MethodSignature, Parameter};

pub use bindings::Bindings;
pub use invoke::ArgumentBuilder;
pub use validate::ShapeViolation;

/// Identifies a disposer within a container by its component and method
/// signature. Displayed as `DisposalMethod-<component>-<signature>`.
///
/// Identity follows the parameter types themselves, not their displayed
/// names, so `release(db::Connection)` and `release(cache::Connection)` are
/// distinct disposers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisposerId {
    component: String,
    signature: MethodSignature,
}

impl DisposerId {
    pub fn new(component: &str, method: &MethodDescriptor) -> Self {
        Self {
            component: component.to_owned(),
            signature: method.signature(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }
}

impl Display for DisposerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "DisposalMethod-{}-{}", self.component, self.signature)
    }
}

/// A disposer method that hasn't been validated yet.
pub struct DisposerCandidate {
    method: MethodDescriptor,
    declaring: Arc<dyn DeclaringComponent>,
}

impl DisposerCandidate {
    pub fn new(method: MethodDescriptor, declaring: Arc<dyn DeclaringComponent>) -> Self {
        Self { method, declaring }
    }

    pub fn id(&self) -> DisposerId {
        DisposerId::new(self.declaring.name(), &self.method)
    }

    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// Checks the shape of the method and computes its bindings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeViolation`] found.
    pub fn validate(self) -> Result<DisposalMethod, ShapeViolation> {
        let disposed_index = validate::validate(&self.method, self.declaring.as_ref())?;
        let bindings = Bindings::compute(&self.method.parameters()[disposed_index]);
        let id = self.id();
        tracing::debug!(disposer = %id, %bindings, "validated disposer");
        Ok(DisposalMethod {
            id,
            method: self.method,
            declaring: self.declaring,
            disposed_index,
            bindings,
        })
    }
}

impl Debug for DisposerCandidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DisposerCandidate")
            .field("method", &self.method)
            .field("declaring", &self.declaring)
            .finish()
    }
}

/// A validated disposer method, ready to be invoked any number of times from
/// any number of threads.
pub struct DisposalMethod {
    id: DisposerId,
    method: MethodDescriptor,
    declaring: Arc<dyn DeclaringComponent>,
    disposed_index: usize,
    bindings: Bindings,
}

impl DisposalMethod {
    pub fn id(&self) -> &DisposerId {
        &self.id
    }

    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    pub fn declaring_component(&self) -> &dyn DeclaringComponent {
        self.declaring.as_ref()
    }

    pub fn disposed_index(&self) -> usize {
        self.disposed_index
    }

    pub fn disposed_parameter(&self) -> &Parameter {
        &self.method.parameters()[self.disposed_index]
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// The parameters resolved by the injector, in declaration order.
    pub fn injection_points(&self) -> impl Iterator<Item = &Parameter> {
        self.method
            .parameters()
            .iter()
            .filter(|parameter| !parameter.is_disposed())
    }

    /// Resolves the instance the method has to be called on, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DisposalError::Receiver`] if the declaring component fails
    /// to provide its instance.
    pub fn resolve_receiver(
        &self,
        context: &CreationalContext,
    ) -> Result<Option<Receiver>, DisposalError> {
        receiver::resolve_receiver(self.method.handle(), self.declaring.as_ref(), context)
            .context(ReceiverSnafu {
                id: self.id.clone(),
            })
    }

    /// Calls the method to dispose `instance`.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver or an argument can't be resolved, if
    /// the method rejects its arguments, or if the method body fails.
    pub fn invoke(
        &self,
        instance: Box<dyn Managed>,
        injector: &dyn Injector,
        context: &CreationalContext,
    ) -> Result<(), DisposalError> {
        let res = self.try_invoke(instance, injector, context);
        if let Err(err) = &res {
            tracing::warn!(disposer = %self.id, origin = context.origin(), "{err}");
        }
        res
    }

    /// Typed shorthand for [`DisposalMethod::invoke`].
    pub fn dispose<T: Managed>(
        &self,
        instance: T,
        injector: &dyn Injector,
        context: &CreationalContext,
    ) -> Result<(), DisposalError> {
        self.invoke(Box::new(instance), injector, context)
    }

    fn try_invoke(
        &self,
        instance: Box<dyn Managed>,
        injector: &dyn Injector,
        context: &CreationalContext,
    ) -> Result<(), DisposalError> {
        let receiver = self.resolve_receiver(context)?;
        let arguments = ArgumentBuilder::new(self).build(instance, injector, context)?;
        tracing::trace!(
            disposer = %self.id,
            receiver = receiver.is_some(),
            ?arguments,
            "invoking disposer"
        );
        self.method
            .handle()
            .invoke(receiver.as_ref(), arguments)
            .map_err(|source| {
                let id = self.id.clone();
                if source.is_invalid_argument() {
                    DisposalError::InvalidArgument { id, source }
                } else {
                    DisposalError::Failed { id, source }
                }
            })
    }
}

impl Display for DisposalMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}::{}", self.declaring.name(), self.method)
    }
}

impl Debug for DisposalMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DisposalMethod")
            .field("id", &self.id)
            .field("disposed_index", &self.disposed_index)
            .field("bindings", &self.bindings)
            .field("declaring", &self.declaring)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum DisposalError {
    #[snafu(display("could not resolve argument #{position} of {id}"))]
    #[non_exhaustive]
    Resolution {
        id: DisposerId,
        position: usize,
        source: InjectorError,
    },
    #[snafu(display("could not resolve the receiver of {id}"))]
    #[non_exhaustive]
    Receiver { id: DisposerId, source: InjectorError },
    #[snafu(display("{id} rejected its arguments"))]
    #[non_exhaustive]
    InvalidArgument {
        id: DisposerId,
        source: InvocationError,
    },
    #[snafu(display("{id} failed"))]
    #[non_exhaustive]
    Failed {
        id: DisposerId,
        source: InvocationError,
    },
    #[snafu(display("could not choose a disposer"))]
    #[non_exhaustive]
    Ambiguous { source: AmbiguousDisposer },
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use crate::container::component::ComponentBean;
    use crate::key::{DefaultQualifier, QualifierSet, TypeRef};
    use crate::method::{param, InstanceMethod, MethodBuilder};

    use super::*;

    struct Factory;

    struct Widget;

    struct AuditLog;

    fn dispose_widget() -> MethodDescriptor {
        MethodBuilder::new("dispose")
            .parameter(param::<Widget>().disposes())
            .parameter(param::<AuditLog>().qualified_by("audit"))
            .build(InstanceMethod::new(|_: &Factory, _: Widget, _: AuditLog| {
                Ok::<_, Infallible>(())
            }))
    }

    mod staging {
        pub struct Widget;
    }

    #[test]
    fn disposer_ids_follow_parameter_types_not_their_names() {
        let local = MethodBuilder::new("release")
            .parameter(param::<Widget>().disposes())
            .build(InstanceMethod::new(|_: &Factory, _: Widget| {
                Ok::<_, Infallible>(())
            }));
        let staged = MethodBuilder::new("release")
            .parameter(param::<staging::Widget>().disposes())
            .build(InstanceMethod::new(|_: &Factory, _: staging::Widget| {
                Ok::<_, Infallible>(())
            }));

        let local_id = DisposerId::new("Factory", &local);
        let staged_id = DisposerId::new("Factory", &staged);
        assert_ne!(local_id, staged_id);
        assert_eq!(local_id.to_string(), staged_id.to_string());
        assert_eq!(local_id, DisposerId::new("Factory", &local));
        assert_eq!(local_id.component(), "Factory");
        assert_eq!(
            staged_id.signature().parameter_types(),
            &[TypeRef::of::<staging::Widget>()]
        );
    }

    #[test]
    fn validated_disposer_exposes_its_bindings() {
        let component = Arc::new(ComponentBean::new("Factory").shared(|_| Ok(Factory)));
        let method = DisposerCandidate::new(dispose_widget(), component)
            .validate()
            .unwrap();

        assert_eq!(
            method.id().to_string(),
            "DisposalMethod-Factory-dispose(Widget, AuditLog)"
        );
        assert_eq!(method.to_string(), "Factory::dispose(Widget, AuditLog)");
        assert_eq!(method.disposed_index(), 0);
        assert_eq!(method.disposed_parameter().ty(), TypeRef::of::<Widget>());
        assert_eq!(method.bindings().qualifiers(), &QualifierSet::of(DefaultQualifier));
        assert!(method.bindings().types().contains(TypeRef::of::<Widget>()));
        assert!(method.bindings().types().contains(TypeRef::universal()));
        assert_eq!(method.declaring_component().name(), "Factory");

        let injected: Vec<_> = method.injection_points().map(Parameter::position).collect();
        assert_eq!(injected, vec![1]);
    }

    #[test]
    fn invalid_candidate_never_becomes_invokable() {
        let descriptor = MethodBuilder::new("dispose")
            .parameter(param::<AuditLog>())
            .parameter(param::<Widget>().disposes())
            .build(InstanceMethod::new(|_: &Factory, _: AuditLog, _: Widget| {
                Ok::<_, Infallible>(())
            }));
        let candidate = DisposerCandidate::new(descriptor, Arc::new(ComponentBean::new("Factory")));
        assert_eq!(
            candidate.id().to_string(),
            "DisposalMethod-Factory-dispose(AuditLog, Widget)"
        );
        assert!(matches!(
            candidate.validate(),
            Err(ShapeViolation::DisposedParameterNotFirst { .. })
        ));
    }

    #[test]
    fn failing_receiver_is_tagged_with_the_disposer() {
        let component = ComponentBean::new("Factory").dependent(|_| {
            Err::<Factory, _>(InjectorError::Unsatisfied {
                parameter: String::from("Factory"),
            })
        });
        let method = DisposerCandidate::new(dispose_widget(), Arc::new(component))
            .validate()
            .unwrap();
        let err = method
            .resolve_receiver(&CreationalContext::new("test"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not resolve the receiver of DisposalMethod-Factory-dispose(Widget, AuditLog)"
        );
    }
}
