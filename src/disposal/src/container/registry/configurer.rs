use std::error::Error;

use crate::container::registry::disposer_map::DisposerMap;
use crate::container::registry::{Configurer, ConfigurerPrivate, RegistryError};
use crate::disposer::DisposerCandidate;

pub struct ConfigurerImpl {
    disposers: DisposerMap,
    errors: Vec<RegistryError>,
}

impl ConfigurerImpl {
    pub fn new() -> Self {
        Self {
            disposers: DisposerMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<DisposerMap, Vec<RegistryError>> {
        if self.errors.is_empty() {
            Ok(self.disposers)
        } else {
            Err(self.errors)
        }
    }
}

impl Configurer for ConfigurerImpl {
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate {
        self
    }

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>) {
        self.errors.push(RegistryError::ModuleInner {
            module,
            source: err,
        });
    }
}

impl ConfigurerPrivate for ConfigurerImpl {
    fn dyn_register(&mut self, candidate: DisposerCandidate) {
        let method = match candidate.validate() {
            Ok(method) => method,
            Err(source) => {
                self.errors.push(RegistryError::Shape { source });
                return;
            }
        };
        match self.disposers.insert(method) {
            Ok(()) => {}
            Err(method) => self.errors.push(RegistryError::DuplicateDisposer {
                id: method.id().clone(),
            }),
        }
    }
}
