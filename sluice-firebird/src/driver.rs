use crate::FirebirdSqlWriter;
use sluice_core::Driver;

pub struct FirebirdDriver {}

impl FirebirdDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for FirebirdDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for FirebirdDriver {
    type SqlWriter = FirebirdSqlWriter;

    const NAME: &'static str = "firebird";

    fn sql_writer(&self) -> FirebirdSqlWriter {
        FirebirdSqlWriter {}
    }
}
