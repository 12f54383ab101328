use crate::MySqlSqlWriter;
use sluice_core::Driver;

pub struct MySqlDriver {}

impl MySqlDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for MySqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for MySqlDriver {
    type SqlWriter = MySqlSqlWriter;

    const NAME: &'static str = "mysql";

    fn sql_writer(&self) -> MySqlSqlWriter {
        MySqlSqlWriter {}
    }
}
