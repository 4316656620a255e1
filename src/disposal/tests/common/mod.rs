#![allow(dead_code)]

use std::collections::HashMap;

use disposal::container::context::CreationalContext;
use disposal::container::injector::{Injector, InjectorError};
use disposal::container::Managed;
use disposal::key::TypeRef;
use disposal::method::Parameter;

type Factory = Box<dyn Fn() -> Box<dyn Managed> + Send + Sync>;

/// Resolves parameters by declared type only, ignoring qualifiers.
#[derive(Default)]
pub struct Beans {
    factories: HashMap<TypeRef, Factory>,
}

impl Beans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Managed + Clone>(mut self, value: T) -> Self {
        let factory: Factory = Box::new(move || Box::new(value.clone()) as Box<dyn Managed>);
        self.factories.insert(TypeRef::of::<T>(), factory);
        self
    }
}

impl Injector for Beans {
    fn dyn_resolve(
        &self,
        parameter: &Parameter,
        _context: &CreationalContext,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        self.factories
            .get(&parameter.ty())
            .map(|factory| factory())
            .ok_or_else(|| InjectorError::unsatisfied(parameter))
    }
}
