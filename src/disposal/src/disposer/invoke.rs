use snafu::prelude::*;

use crate::container::context::CreationalContext;
use crate::container::injector::Injector;
use crate::container::Managed;
use crate::disposer::{DisposalError, DisposalMethod, ResolutionSnafu};
use crate::method::Arguments;

/// Lays out the arguments of one disposer call.
///
/// The disposed instance goes straight into its slot; every other slot is
/// filled by the injector, once per parameter and in declaration order.
pub struct ArgumentBuilder<'a> {
    method: &'a DisposalMethod,
}

impl<'a> ArgumentBuilder<'a> {
    pub fn new(method: &'a DisposalMethod) -> Self {
        Self { method }
    }

    /// # Errors
    ///
    /// Returns [`DisposalError::Resolution`] for the first parameter the
    /// injector can't resolve. Later parameters are not attempted.
    pub fn build(
        &self,
        instance: Box<dyn Managed>,
        injector: &dyn Injector,
        context: &CreationalContext,
    ) -> Result<Arguments, DisposalError> {
        let disposed_index = self.method.disposed_index();
        let mut instance = Some(instance);
        let mut values = Vec::with_capacity(self.method.method().parameters().len());
        for parameter in self.method.method().parameters() {
            let position = parameter.position();
            let disposed = (position == disposed_index).then(|| instance.take());
            let value = match disposed.flatten() {
                Some(instance) => instance,
                None => injector
                    .dyn_resolve(parameter, context)
                    .context(ResolutionSnafu {
                        id: self.method.id().clone(),
                        position,
                    })?,
            };
            tracing::trace!(disposer = %self.method.id(), %parameter, "argument ready");
            values.push(value);
        }
        Ok(Arguments::new(values))
    }
}
