use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::context::CreationalContext;
use crate::container::Managed;
use crate::method::Parameter;
use crate::util::any::Downcast;

/// The container's injection mechanism, consumed for every parameter of a
/// disposer method except the disposed one.
#[cfg_attr(test, mockall::automock)]
pub trait Injector: Send + Sync {
    /// Resolves a type-erased value for the injection point described by
    /// `parameter`, which carries the declared type and qualifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if no value or more than one candidate satisfies the
    /// injection point, or if constructing the value fails.
    fn dyn_resolve(
        &self,
        parameter: &Parameter,
        context: &CreationalContext,
    ) -> Result<Box<dyn Managed>, InjectorError>;
}

pub trait TypedInjector: Injector {
    fn resolve<T>(
        &self,
        parameter: &Parameter,
        context: &CreationalContext,
    ) -> Result<T, InjectorError>
    where
        T: Managed,
    {
        let object = self.dyn_resolve(parameter, context)?;
        match object.downcast::<T>() {
            Ok(object) => Ok(*object),
            Err(object) => Err(InjectorError::TypeMismatch {
                parameter: parameter.to_string(),
                found: (*object).type_name(),
            }),
        }
    }
}

impl<T: Injector + ?Sized> TypedInjector for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InjectorError {
    #[snafu(display("could not find any object satisfying {parameter}"))]
    #[non_exhaustive]
    Unsatisfied { parameter: String },
    #[snafu(display("{candidates} objects satisfy {parameter}, expected exactly one"))]
    #[non_exhaustive]
    Ambiguous { parameter: String, candidates: usize },
    #[snafu(display("the object resolved for {parameter} is a {found}"))]
    #[non_exhaustive]
    TypeMismatch {
        parameter: String,
        found: &'static str,
    },
    #[snafu(display("could not construct {component} which depends on itself somehow"))]
    #[non_exhaustive]
    CyclicDependency { component: String },
    #[snafu(display("could not construct the object for {parameter}"))]
    #[non_exhaustive]
    ObjectConstruction {
        parameter: String,
        source: Arc<dyn Error + Send + Sync>,
    },
}

impl InjectorError {
    pub fn unsatisfied(parameter: &Parameter) -> Self {
        Self::Unsatisfied {
            parameter: parameter.to_string(),
        }
    }

    pub fn ambiguous(parameter: &Parameter, candidates: usize) -> Self {
        Self::Ambiguous {
            parameter: parameter.to_string(),
            candidates,
        }
    }

    pub fn construction<E>(parameter: &Parameter, err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::ObjectConstruction {
            parameter: parameter.to_string(),
            source: Arc::from(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::method::param;

    use super::*;

    #[test]
    fn typed_injector_downcasts_resolved_object() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_resolve()
            .returning(|_, _| Ok(Box::new(42u64)));

        let parameter = param::<u64>().at(1);
        let context = CreationalContext::new("test");
        let value: u64 = injector.resolve(&parameter, &context).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn typed_injector_reports_type_mismatch() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_resolve()
            .returning(|_, _| Ok(Box::new("not a number")));

        let parameter = param::<u64>().at(1);
        let context = CreationalContext::new("test");
        let res = injector.resolve::<u64>(&parameter, &context);
        assert!(matches!(res, Err(InjectorError::TypeMismatch { .. })));
    }

    #[test]
    fn injector_error_constructors_name_the_parameter() {
        let parameter = param::<u64>().qualified_by("retries").at(2);
        let err = InjectorError::unsatisfied(&parameter);
        assert_eq!(
            err.to_string(),
            "could not find any object satisfying #2 u64 {\"retries\"}"
        );
        let err = InjectorError::construction(&parameter, "boom");
        assert!(matches!(err, InjectorError::ObjectConstruction { .. }));
    }
}
