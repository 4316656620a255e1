use std::collections::HashSet;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::container::context::CreationalContext;
use crate::container::injector::InjectorError;
use crate::container::{Managed, Receiver};
use crate::key::TypeRef;
use crate::method::MethodSignature;

/// The component that declares a disposer method.
///
/// The container owns the policies behind each of these queries; the
/// disposer subsystem only consumes them.
pub trait DeclaringComponent: Debug + Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Returns false if methods of this component are called without an
    /// instance, as for stateless or purely static components.
    fn requires_receiver(&self) -> bool;

    /// Returns true if a disposer with the given signature can be reached
    /// through the component's public contract.
    fn is_reachable(&self, signature: &MethodSignature) -> bool {
        let _ = signature;
        true
    }

    /// Returns the component's contextual instance, following its own scope
    /// rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance can't be obtained.
    fn contextual_instance(&self, context: &CreationalContext) -> Result<Receiver, InjectorError>;
}

/// A set of method signatures a component exposes to its clients.
#[derive(Debug, Clone)]
pub struct BusinessInterface {
    name: String,
    methods: HashSet<MethodSignature>,
}

impl BusinessInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashSet::new(),
        }
    }

    pub fn method(mut self, name: &str, parameter_types: impl IntoIterator<Item = TypeRef>) -> Self {
        let signature = MethodSignature::new(name, parameter_types.into_iter().collect());
        self.methods.insert(signature);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exposes(&self, signature: &MethodSignature) -> bool {
        self.methods.contains(signature)
    }
}

type InstanceFactory =
    Box<dyn Fn(&CreationalContext) -> Result<Receiver, InjectorError> + Send + Sync>;

enum InstanceSource {
    None,
    Preset(Receiver),
    Dependent(InstanceFactory),
    Shared {
        factory: InstanceFactory,
        instance: Mutex<Option<Receiver>>,
        constructing: Mutex<Option<ThreadId>>,
    },
}

/// Marks a shared instance as being constructed by the current thread until
/// dropped.
struct ConstructionGuard<'a> {
    constructing: &'a Mutex<Option<ThreadId>>,
}

impl<'a> ConstructionGuard<'a> {
    fn enter(constructing: &'a Mutex<Option<ThreadId>>) -> Self {
        *constructing.lock() = Some(thread::current().id());
        Self { constructing }
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        *self.constructing.lock() = None;
    }
}

/// A ready-made [`DeclaringComponent`].
///
/// A bean is a plain component unless business interfaces are added, in
/// which case only the methods those interfaces expose are reachable. Its
/// instances are either absent (static-equivalent), dependent (a new one per
/// request, parked in the [`CreationalContext`]) or shared (created on first
/// request, then reused).
///
/// # Examples
///
/// ```rust
/// # use disposal::container::component::ComponentBean;
/// struct Factory;
///
/// let bean = ComponentBean::new("Factory").shared(|_| Ok(Factory));
/// ```
pub struct ComponentBean {
    name: String,
    interfaces: Option<Vec<BusinessInterface>>,
    instances: InstanceSource,
}

impl ComponentBean {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interfaces: None,
            instances: InstanceSource::None,
        }
    }

    pub fn dependent<T, F>(mut self, factory: F) -> Self
    where
        T: Managed,
        F: Fn(&CreationalContext) -> Result<T, InjectorError> + Send + Sync + 'static,
    {
        self.instances = InstanceSource::Dependent(Self::erase(factory));
        self
    }

    pub fn shared<T, F>(mut self, factory: F) -> Self
    where
        T: Managed,
        F: Fn(&CreationalContext) -> Result<T, InjectorError> + Send + Sync + 'static,
    {
        self.instances = InstanceSource::Shared {
            factory: Self::erase(factory),
            instance: Mutex::new(None),
            constructing: Mutex::new(None),
        };
        self
    }

    /// Makes `instance` the shared instance of the bean.
    pub fn with_instance<T: Managed>(mut self, instance: T) -> Self {
        self.instances = InstanceSource::Preset(Receiver::new(instance));
        self
    }

    pub fn business_interface(mut self, interface: BusinessInterface) -> Self {
        self.interfaces.get_or_insert_with(Vec::new).push(interface);
        self
    }

    fn erase<T, F>(factory: F) -> InstanceFactory
    where
        T: Managed,
        F: Fn(&CreationalContext) -> Result<T, InjectorError> + Send + Sync + 'static,
    {
        Box::new(move |context: &CreationalContext| factory(context).map(Receiver::new))
    }
}

impl DeclaringComponent for ComponentBean {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_receiver(&self) -> bool {
        !matches!(self.instances, InstanceSource::None)
    }

    fn is_reachable(&self, signature: &MethodSignature) -> bool {
        match &self.interfaces {
            Some(interfaces) => interfaces.iter().any(|i| i.exposes(signature)),
            None => true,
        }
    }

    fn contextual_instance(&self, context: &CreationalContext) -> Result<Receiver, InjectorError> {
        match &self.instances {
            InstanceSource::None => Err(InjectorError::Unsatisfied {
                parameter: format!("instance of {}", self.name),
            }),
            InstanceSource::Preset(receiver) => Ok(receiver.clone()),
            InstanceSource::Dependent(factory) => {
                let receiver = factory(context)?;
                context.push_dependent(receiver.clone());
                Ok(receiver)
            }
            InstanceSource::Shared {
                factory,
                instance,
                constructing,
            } => {
                // The factory runs with `instance` locked, so a factory asking
                // for its own bean must fail here rather than block forever.
                if *constructing.lock() == Some(thread::current().id()) {
                    return Err(InjectorError::CyclicDependency {
                        component: self.name.clone(),
                    });
                }
                let mut instance = instance.lock();
                if let Some(receiver) = instance.as_ref() {
                    return Ok(receiver.clone());
                }
                let receiver = {
                    let _guard = ConstructionGuard::enter(constructing);
                    factory(context)?
                };
                tracing::debug!(component = %self.name, "created shared instance");
                *instance = Some(receiver.clone());
                Ok(receiver)
            }
        }
    }
}

impl Debug for ComponentBean {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let instances = match self.instances {
            InstanceSource::None => "none",
            InstanceSource::Dependent(_) => "dependent",
            InstanceSource::Preset(_) | InstanceSource::Shared { .. } => "shared",
        };
        f.debug_struct("ComponentBean")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces)
            .field("instances", &instances)
            .finish()
    }
}
