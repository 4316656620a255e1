use std::any;
use std::error::Error;

use crate::container::registry::Configurer;

/// A unit of bootstrap configuration registering disposers.
pub trait Module: 'static {
    fn setup(&self, configurer: &mut dyn Configurer) {
        if let Err(err) = self.configure(configurer) {
            configurer.report_module_error(any::type_name::<Self>(), err);
        }
    }

    /// # Errors
    ///
    /// Returns an error if the module can't describe its disposers. The
    /// error is reported and bootstrap fails once every module has run.
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

impl<F> Module for F
where
    F: Fn(&mut dyn Configurer) -> Result<(), Box<dyn Error + Send + Sync>> + 'static,
{
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self(configurer)
    }
}

/// An ordered group of modules, itself usable as a [`Module`].
///
/// Modules run in the order they were added. A failing module doesn't stop
/// the others: its error is reported and bootstrap fails once all of them
/// have run.
#[derive(Default)]
pub struct Configuration {
    modules: Vec<Box<dyn Module>>,
}

impl Configuration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Appends every module of `other` after the modules of `self`.
    pub fn compose(mut self, other: Configuration) -> Self {
        self.extend(other.modules);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Extend<Box<dyn Module>> for Configuration {
    fn extend<I: IntoIterator<Item = Box<dyn Module>>>(&mut self, modules: I) {
        self.modules.extend(modules);
    }
}

impl FromIterator<Box<dyn Module>> for Configuration {
    fn from_iter<I: IntoIterator<Item = Box<dyn Module>>>(modules: I) -> Self {
        Self {
            modules: modules.into_iter().collect(),
        }
    }
}

impl Module for Configuration {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        for (index, module) in self.modules.iter().enumerate() {
            tracing::trace!(module = index, total = self.modules.len(), "setting up module");
            module.setup(configurer);
        }
        Ok(())
    }
}
