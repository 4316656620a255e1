//! Bootstrap-time registration of disposers and their lookup afterwards.

mod configurer;
mod disposer_map;
mod matcher;

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::component::DeclaringComponent;
use crate::container::context::CreationalContext;
use crate::container::injector::Injector;
use crate::container::Managed;
use crate::disposer::{
    AmbiguousSnafu, DisposalError, DisposalMethod, DisposerCandidate, DisposerId, ShapeViolation,
};
use crate::key::{QualifierSet, TypeRef};
use crate::method::{Disposers, MethodDescriptor};
use crate::module::Module;
use crate::util::name::abbreviate;

pub(crate) use configurer::ConfigurerImpl;
use disposer_map::DisposerMap;
pub use matcher::{QualifierMatcher, SubsetMatcher};

#[cfg(test)]
pub use matcher::MockQualifierMatcher;

/// Every validated disposer of a container.
///
/// A registry is immutable once built, so it can be shared between threads
/// freely.
pub struct DisposerRegistry {
    disposers: DisposerMap,
    matcher: Box<dyn QualifierMatcher>,
}

impl DisposerRegistry {
    /// Builds a registry from `module`, matching qualifiers with
    /// [`SubsetMatcher`].
    ///
    /// # Errors
    ///
    /// Returns every error reported while setting up `module`. A single error
    /// is returned as is, several are wrapped in
    /// [`RegistryError::Aggregated`].
    pub fn init<M: Module>(module: M) -> Result<Self, RegistryError> {
        Self::init_with_matcher(module, SubsetMatcher)
    }

    /// Builds a registry from `module` with custom qualifier rules.
    ///
    /// # Errors
    ///
    /// See [`DisposerRegistry::init`].
    pub fn init_with_matcher<M, Q>(module: M, matcher: Q) -> Result<Self, RegistryError>
    where
        M: Module,
        Q: QualifierMatcher,
    {
        let mut configurer = ConfigurerImpl::new();
        module.setup(&mut configurer);
        let disposers = configurer.finish().map_err(|mut errors| {
            if errors.len() == 1 {
                errors.remove(0)
            } else {
                RegistryError::Aggregated { errors }
            }
        })?;
        tracing::debug!(disposers = disposers.len(), "disposer registry initialized");
        Ok(Self {
            disposers,
            matcher: Box::new(matcher),
        })
    }

    pub fn get(&self, id: &DisposerId) -> Option<&Arc<DisposalMethod>> {
        self.disposers.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DisposalMethod>> {
        self.disposers.iter()
    }

    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }

    /// Finds the disposer for an instance of type `ty` qualified by
    /// `qualifiers`. An empty qualifier set stands for `{Default}`.
    ///
    /// # Errors
    ///
    /// Returns [`AmbiguousDisposer`] if more than one disposer applies.
    pub fn resolve(
        &self,
        ty: TypeRef,
        qualifiers: &QualifierSet,
    ) -> Result<Option<Arc<DisposalMethod>>, AmbiguousDisposer> {
        let default;
        let qualifiers = if qualifiers.is_empty() {
            default = QualifierSet::default_set();
            &default
        } else {
            qualifiers
        };
        let mut matching: Vec<_> = self
            .disposers
            .candidates(ty)
            .iter()
            .filter(|method| {
                method
                    .bindings()
                    .admits(ty, qualifiers, self.matcher.as_ref())
            })
            .collect();
        tracing::debug!(%ty, %qualifiers, matching = matching.len(), "resolved disposers");
        match matching.len() {
            0 => Ok(None),
            1 => Ok(matching.pop().map(Arc::clone)),
            _ => AmbiguousDisposerSnafu {
                ty,
                qualifiers: qualifiers.clone(),
                candidates: matching
                    .iter()
                    .map(|method| method.id().clone())
                    .collect::<Vec<_>>(),
            }
            .fail(),
        }
    }

    /// Disposes `instance` with the disposer matching its type and
    /// `qualifiers`.
    ///
    /// Returns the id of the disposer called, or `None` if no disposer
    /// applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup is ambiguous or the invocation fails.
    pub fn dispose<T: Managed>(
        &self,
        instance: T,
        qualifiers: &QualifierSet,
        injector: &dyn Injector,
        context: &CreationalContext,
    ) -> Result<Option<DisposerId>, DisposalError> {
        let Some(method) = self
            .resolve(TypeRef::of::<T>(), qualifiers)
            .context(AmbiguousSnafu)?
        else {
            tracing::trace!(ty = %TypeRef::of::<T>(), "no disposer applies");
            return Ok(None);
        };
        method.dispose(instance, injector, context)?;
        Ok(Some(method.id().clone()))
    }
}

pub trait Configurer {
    #[doc(hidden)]
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate;

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>);
}

trait ConfigurerPrivate: Configurer {
    fn dyn_register(&mut self, candidate: DisposerCandidate);
}

pub trait TypedConfigurer: Configurer {
    /// Registers `method` as a disposer declared by `declaring`. The method
    /// is validated right away; violations surface when bootstrap finishes.
    fn register(&mut self, method: MethodDescriptor, declaring: Arc<dyn DeclaringComponent>) {
        self.as_private()
            .dyn_register(DisposerCandidate::new(method, declaring));
    }

    /// Registers every disposer method `C` declares.
    fn register_all<C: Disposers>(&mut self, declaring: Arc<dyn DeclaringComponent>) {
        for method in C::disposal_methods() {
            self.register(method, Arc::clone(&declaring));
        }
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

/// More than one disposer applies to an instance.
#[derive(Debug, Snafu)]
#[snafu(display(
    "{} disposers apply to {ty} {qualifiers}: {}",
    candidates.len(),
    candidates.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
))]
pub struct AmbiguousDisposer {
    ty: TypeRef,
    qualifiers: QualifierSet,
    candidates: Vec<DisposerId>,
}

impl AmbiguousDisposer {
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn candidates(&self) -> &[DisposerId] {
        &self.candidates
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("malformed disposer: {source}"))]
    #[non_exhaustive]
    Shape { source: ShapeViolation },
    #[snafu(display("disposer {id} is registered more than once"))]
    #[non_exhaustive]
    DuplicateDisposer { id: DisposerId },
    #[snafu(display("module {} fails to setup the configuration", abbreviate(module)))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("aggregated registry errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<RegistryError> },
}

struct AggregatedDisplayer<'a> {
    errors: &'a [RegistryError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [RegistryError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}
