pub mod component;
pub mod context;
pub mod injector;
pub mod registry;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::util::any::AsAny;

/// Anything the container can hand around type-erased: disposed instances,
/// injected arguments and receivers.
pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// The owning instance a disposer method is called on.
#[derive(Clone)]
pub struct Receiver {
    instance: Arc<dyn Managed>,
}

impl Receiver {
    pub fn new<T: Managed>(instance: T) -> Self {
        Self::from_shared(Arc::new(instance))
    }

    pub fn from_shared(instance: Arc<dyn Managed>) -> Self {
        Self { instance }
    }

    pub fn downcast_ref<T: Managed>(&self) -> Option<&T> {
        (*self.instance).as_any().downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        (*self.instance).type_name()
    }

    pub fn ptr_eq(&self, other: &Receiver) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl Debug for Receiver {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Receiver")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Factory {
        label: &'static str,
    }

    #[test]
    fn receiver_downcasts_to_concrete_type() {
        let receiver = Receiver::new(Factory { label: "widgets" });
        assert_eq!(receiver.downcast_ref::<Factory>().map(|f| f.label), Some("widgets"));
        assert!(receiver.downcast_ref::<String>().is_none());
        assert!(receiver.type_name().ends_with("Factory"));
    }

    #[test]
    fn receiver_clones_share_the_instance() {
        let receiver = Receiver::new(Factory { label: "widgets" });
        let other = receiver.clone();
        assert!(receiver.ptr_eq(&other));
        assert!(!receiver.ptr_eq(&Receiver::new(Factory { label: "widgets" })));
    }
}
