use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::mem;

use parking_lot::Mutex;

use crate::container::Managed;

/// Per-call state owned by whoever triggers a disposal.
///
/// Injectors and declaring components may park dependent instances they
/// create for the call here. Dependents are dropped in reverse order of
/// creation when the context is released or dropped.
pub struct CreationalContext {
    origin: String,
    dependents: Mutex<Vec<Box<dyn Managed>>>,
}

impl CreationalContext {
    /// Creates a context. `origin` names the instance being torn down and only
    /// shows up in diagnostics.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            dependents: Mutex::new(Vec::new()),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn push_dependent<T: Managed>(&self, dependent: T) {
        self.dependents.lock().push(Box::new(dependent));
    }

    pub fn dependent_count(&self) -> usize {
        self.dependents.lock().len()
    }

    /// Drops every dependent collected so far, newest first.
    pub fn release(&self) {
        let mut dependents = mem::take(&mut *self.dependents.lock());
        while let Some(dependent) = dependents.pop() {
            drop(dependent);
        }
    }
}

impl Drop for CreationalContext {
    fn drop(&mut self) {
        self.release();
    }
}

impl Debug for CreationalContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CreationalContext")
            .field("origin", &self.origin)
            .field("dependents", &self.dependent_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    struct Tracked {
        id: u32,
        log: Arc<Mutex<Vec<u32>>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.lock().push(self.id);
        }
    }

    #[test]
    fn release_drops_dependents_newest_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let context = CreationalContext::new("widget#1");
        for id in 0..3 {
            context.push_dependent(Tracked {
                id,
                log: Arc::clone(&log),
            });
        }
        assert_eq!(context.dependent_count(), 3);

        context.release();
        assert_eq!(context.dependent_count(), 0);
        assert_eq!(*log.lock(), vec![2, 1, 0]);
    }

    #[test]
    fn drop_releases_remaining_dependents() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let context = CreationalContext::new("widget#2");
            context.push_dependent(Tracked {
                id: 7,
                log: Arc::clone(&log),
            });
        }
        assert_eq!(*log.lock(), vec![7]);
    }
}
