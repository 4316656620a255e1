use snafu::prelude::*;

use crate::container::component::DeclaringComponent;
use crate::method::{MethodDescriptor, MethodMarker, ParameterMarker};

/// A disposer method whose shape makes it unusable. Every variant names the
/// method as `Component::method(Types)`.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ShapeViolation {
    #[snafu(display("{signature} has no parameter marked as disposed"))]
    #[non_exhaustive]
    MissingDisposedParameter { signature: String },
    #[snafu(display(
        "{signature} doesn't have the disposed parameter first, found it at #{position}"
    ))]
    #[non_exhaustive]
    DisposedParameterNotFirst { signature: String, position: usize },
    #[snafu(display(
        "{signature} has more than one disposed parameter, at {}",
        positions.iter().map(|p| format!("#{p}")).collect::<Vec<_>>().join(", ")
    ))]
    #[non_exhaustive]
    DuplicateDisposedParameter {
        signature: String,
        positions: Vec<usize>,
    },
    #[snafu(display("observed parameter #{position} is not allowed on disposer {signature}"))]
    #[non_exhaustive]
    ObserverParameter { signature: String, position: usize },
    #[snafu(display("disposer {signature} can't be an initializer"))]
    #[non_exhaustive]
    InitializerMethod { signature: String },
    #[snafu(display("disposer {signature} can't be a producer"))]
    #[non_exhaustive]
    ProducerMethod { signature: String },
    #[snafu(display(
        "disposer {signature} must be declared on a business interface of {component}"
    ))]
    #[non_exhaustive]
    NotOnBusinessInterface {
        signature: String,
        component: String,
    },
}

impl ShapeViolation {
    /// The offending method as `Component::method(Types)`.
    pub fn signature(&self) -> &str {
        match self {
            Self::MissingDisposedParameter { signature }
            | Self::DisposedParameterNotFirst { signature, .. }
            | Self::DuplicateDisposedParameter { signature, .. }
            | Self::ObserverParameter { signature, .. }
            | Self::InitializerMethod { signature }
            | Self::ProducerMethod { signature }
            | Self::NotOnBusinessInterface { signature, .. } => signature,
        }
    }
}

/// Checks the shape rules of a disposer method in order and returns the
/// index of the disposed parameter, which is always 0 on success.
pub(crate) fn validate(
    method: &MethodDescriptor,
    declaring: &dyn DeclaringComponent,
) -> Result<usize, ShapeViolation> {
    let signature = format!("{}::{}", declaring.name(), method);
    let disposed: Vec<usize> = method
        .parameters_marked(ParameterMarker::Disposes)
        .iter()
        .map(|parameter| parameter.position())
        .collect();

    match (method.parameters().first(), disposed.first()) {
        (_, None) => return MissingDisposedParameterSnafu { signature }.fail(),
        (Some(first), Some(_)) if first.is_disposed() => {}
        (_, Some(&position)) => {
            return DisposedParameterNotFirstSnafu {
                signature,
                position,
            }
            .fail()
        }
    }
    ensure!(
        disposed.len() == 1,
        DuplicateDisposedParameterSnafu {
            signature,
            positions: disposed,
        }
    );
    if let Some(observed) = method.parameters_marked(ParameterMarker::Observes).first() {
        return ObserverParameterSnafu {
            signature,
            position: observed.position(),
        }
        .fail();
    }
    ensure!(
        !method.is_marked(MethodMarker::Initializer),
        InitializerMethodSnafu { signature }
    );
    ensure!(
        !method.is_marked(MethodMarker::Produces),
        ProducerMethodSnafu { signature }
    );
    ensure!(
        declaring.is_reachable(&method.signature()),
        NotOnBusinessInterfaceSnafu {
            signature,
            component: declaring.name(),
        }
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use crate::container::component::{BusinessInterface, ComponentBean};
    use crate::key::TypeRef;
    use crate::method::{param, MethodBuilder, ParameterBuilder, StaticMethod};

    use super::*;

    struct Widget;

    struct AuditLog;

    fn method(name: &str, parameters: Vec<ParameterBuilder>) -> MethodBuilder {
        parameters
            .into_iter()
            .fold(MethodBuilder::new(name), MethodBuilder::parameter)
    }

    fn noop() -> StaticMethod<impl Fn(Widget) -> Result<(), Infallible> + Send + Sync, (Widget,)> {
        StaticMethod::new(|_: Widget| Ok(()))
    }

    fn factory() -> ComponentBean {
        ComponentBean::new("Factory")
    }

    #[test]
    fn well_formed_disposer_passes() {
        let descriptor = method(
            "dispose",
            vec![param::<Widget>().disposes(), param::<AuditLog>()],
        )
        .build(noop());
        assert_eq!(validate(&descriptor, &factory()).unwrap(), 0);
    }

    #[test]
    fn zero_parameters_is_a_violation() {
        let descriptor = method("dispose", vec![]).build(noop());
        let err = validate(&descriptor, &factory()).unwrap_err();
        assert!(matches!(err, ShapeViolation::MissingDisposedParameter { .. }));
        assert_eq!(err.to_string(), "Factory::dispose() has no parameter marked as disposed");
    }

    #[test]
    fn unmarked_parameters_are_a_violation() {
        let descriptor = method("dispose", vec![param::<Widget>(), param::<AuditLog>()]).build(noop());
        let err = validate(&descriptor, &factory()).unwrap_err();
        assert!(matches!(err, ShapeViolation::MissingDisposedParameter { .. }));
    }

    #[test]
    fn disposed_parameter_must_come_first() {
        let descriptor = method(
            "dispose",
            vec![param::<AuditLog>(), param::<Widget>().disposes()],
        )
        .build(noop());
        let err = validate(&descriptor, &factory()).unwrap_err();
        assert!(matches!(
            err,
            ShapeViolation::DisposedParameterNotFirst { position: 1, .. }
        ));
        assert_eq!(err.signature(), "Factory::dispose(AuditLog, Widget)");
    }

    #[test]
    fn duplicate_disposed_parameters_are_listed() {
        let descriptor = method(
            "dispose",
            vec![
                param::<Widget>().disposes(),
                param::<AuditLog>(),
                param::<Widget>().disposes(),
            ],
        )
        .build(noop());
        let err = validate(&descriptor, &factory()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Factory::dispose(Widget, AuditLog, Widget) has more than one disposed parameter, at #0, #2"
        );
    }

    #[test]
    fn observer_parameter_is_a_violation() {
        let descriptor = method(
            "dispose",
            vec![param::<Widget>().disposes(), param::<AuditLog>().observes()],
        )
        .build(noop());
        let err = validate(&descriptor, &factory()).unwrap_err();
        assert!(matches!(err, ShapeViolation::ObserverParameter { position: 1, .. }));
    }

    #[test]
    fn observer_is_rejected_even_on_the_disposed_parameter() {
        let descriptor = method("dispose", vec![param::<Widget>().disposes().observes()]).build(noop());
        let err = validate(&descriptor, &factory()).unwrap_err();
        assert!(matches!(err, ShapeViolation::ObserverParameter { position: 0, .. }));
    }

    #[test]
    fn method_markers_are_violations() {
        let initializer = method("dispose", vec![param::<Widget>().disposes()])
            .marked(MethodMarker::Initializer)
            .build(noop());
        let err = validate(&initializer, &factory()).unwrap_err();
        assert!(matches!(err, ShapeViolation::InitializerMethod { .. }));

        let producer = method("dispose", vec![param::<Widget>().disposes()])
            .marked(MethodMarker::Produces)
            .build(noop());
        let err = validate(&producer, &factory()).unwrap_err();
        assert!(matches!(err, ShapeViolation::ProducerMethod { .. }));
    }

    #[test]
    fn rules_are_checked_in_order() {
        let descriptor = method("dispose", vec![param::<AuditLog>().observes()])
            .marked(MethodMarker::Produces)
            .build(noop());
        let err = validate(&descriptor, &factory()).unwrap_err();
        assert!(matches!(err, ShapeViolation::MissingDisposedParameter { .. }));
    }

    #[test]
    fn business_interface_must_expose_the_disposer() {
        let component = factory().business_interface(
            BusinessInterface::new("WidgetLifecycle").method("close", [TypeRef::of::<Widget>()]),
        );
        let descriptor = method("dispose", vec![param::<Widget>().disposes()]).build(noop());
        let err = validate(&descriptor, &component).unwrap_err();
        assert_eq!(
            err.to_string(),
            "disposer Factory::dispose(Widget) must be declared on a business interface of Factory"
        );

        let exposed = method("close", vec![param::<Widget>().disposes()]).build(noop());
        assert!(validate(&exposed, &component).is_ok());
    }
}
