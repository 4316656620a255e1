use std::fmt::{Display, Formatter, Result as FmtResult};

use disposal::prelude::*;

pub struct Connection;

pub struct Pool;

#[derive(Debug)]
pub struct PoolError;

impl Display for PoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("pool error")
    }
}

impl std::error::Error for PoolError {}

#[disposers]
impl Pool {
    #[disposer]
    pub fn unit(&self, #[disposes] _connection: Connection) {}

    #[disposer]
    pub fn explicit_unit(&self, #[disposes] _connection: Connection) -> () {}

    #[disposer]
    pub fn result(&self, #[disposes] _connection: Connection) -> Result<(), PoolError> {
        Ok(())
    }

    #[disposer]
    pub fn full_path(
        &self,
        #[disposes] _connection: Connection,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

fn main() {
    assert_eq!(Pool::disposal_methods().len(), 4);
}
