use crate::OracleSqlWriter;
use sluice_core::Driver;

pub struct OracleDriver {}

impl OracleDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for OracleDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for OracleDriver {
    type SqlWriter = OracleSqlWriter;

    const NAME: &'static str = "oracle";

    fn sql_writer(&self) -> OracleSqlWriter {
        OracleSqlWriter {}
    }
}
