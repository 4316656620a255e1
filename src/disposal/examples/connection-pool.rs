use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use disposal::method::Parameter;
use disposal::prelude::*;

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let registry = DisposerRegistry::init(
        Configuration::new()
            .with(PoolModule::new("db-main"))
            .with(ScratchModule),
    )?;
    for method in registry.iter() {
        println!("{} binds {}", method, method.bindings());
    }

    let injector = StaticInjector;
    let context = CreationalContext::new("request #1");
    for id in 0..3 {
        registry.dispose(
            Connection { id },
            &QualifierSet::of("primary"),
            &injector,
            &context,
        )?;
    }
    registry.dispose(
        ScratchFile {
            path: String::from("/tmp/upload.part"),
        },
        &QualifierSet::default_set(),
        &injector,
        &context,
    )?;
    Ok(())
}

pub struct Connection {
    id: u32,
}

pub struct ScratchFile {
    path: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    millis: u64,
}

pub struct Pool {
    name: &'static str,
    released: AtomicUsize,
}

#[disposers]
impl Pool {
    #[disposer]
    pub fn release(
        &self,
        #[disposes]
        #[named("primary")]
        connection: Connection,
        deadline: Deadline,
    ) {
        let released = self.released.fetch_add(1, Ordering::SeqCst) + 1;
        println!(
            "{}: released connection {} within {}ms ({released} so far)",
            self.name, connection.id, deadline.millis
        );
    }
}

pub struct Scratch;

#[disposers]
impl Scratch {
    #[disposer]
    pub fn remove(#[disposes] file: ScratchFile) -> Result<(), std::io::Error> {
        println!("removing {}", file.path);
        Ok(())
    }
}

struct PoolModule {
    name: &'static str,
}

impl PoolModule {
    fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Module for PoolModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let name = self.name;
        let bean = ComponentBean::new("Pool").shared(move |_| {
            Ok(Pool {
                name,
                released: AtomicUsize::new(0),
            })
        });
        configurer.register_all::<Pool>(Arc::new(bean));
        Ok(())
    }
}

struct ScratchModule;

impl Module for ScratchModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        configurer.register_all::<Scratch>(Arc::new(ComponentBean::new("Scratch")));
        Ok(())
    }
}

struct StaticInjector;

impl Injector for StaticInjector {
    fn dyn_resolve(
        &self,
        parameter: &Parameter,
        _context: &CreationalContext,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        if parameter.ty() == TypeRef::of::<Deadline>() {
            Ok(Box::new(Deadline { millis: 250 }))
        } else {
            Err(InjectorError::unsatisfied(parameter))
        }
    }
}
