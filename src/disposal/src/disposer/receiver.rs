use crate::container::component::DeclaringComponent;
use crate::container::context::CreationalContext;
use crate::container::injector::InjectorError;
use crate::container::Receiver;
use crate::method::MethodHandle;

/// Finds the instance a disposer has to be called on.
///
/// Returns `None` without consulting the component if either the handle or
/// the component can do without a receiver. Nothing is cached; every call
/// goes back to the component's own scope rules.
pub(crate) fn resolve_receiver(
    handle: &dyn MethodHandle,
    declaring: &dyn DeclaringComponent,
    context: &CreationalContext,
) -> Result<Option<Receiver>, InjectorError> {
    if !handle.requires_receiver() || !declaring.requires_receiver() {
        return Ok(None);
    }
    declaring.contextual_instance(context).map(Some)
}
