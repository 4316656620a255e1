#![allow(clippy::new_without_default)]

pub mod container;
pub mod disposer;
pub mod key;
pub mod method;
pub mod module;
mod util;

pub use disposal_derive::disposers;

pub mod prelude {
    pub use crate::container::component::{BusinessInterface, ComponentBean, DeclaringComponent};
    pub use crate::container::context::CreationalContext;
    pub use crate::container::injector::{Injector, InjectorError, TypedInjector};
    pub use crate::container::registry::{
        Configurer, DisposerRegistry, QualifierMatcher, RegistryError, SubsetMatcher,
        TypedConfigurer,
    };
    pub use crate::container::{Managed, Receiver};
    pub use crate::disposer::{DisposalError, DisposalMethod, DisposerCandidate, DisposerId};
    pub use crate::disposers;
    pub use crate::key::{QualifierSet, TypeRef};
    pub use crate::method::{
        param, Disposers, InstanceMethod, MethodBuilder, MethodDescriptor, StaticMethod,
    };
    pub use crate::module::{Configuration, Module};
}
