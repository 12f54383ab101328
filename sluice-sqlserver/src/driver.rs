use crate::SqlServerSqlWriter;
use sluice_core::Driver;

pub struct SqlServerDriver {}

impl SqlServerDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for SqlServerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for SqlServerDriver {
    type SqlWriter = SqlServerSqlWriter;

    const NAME: &'static str = "sqlserver";

    fn sql_writer(&self) -> SqlServerSqlWriter {
        SqlServerSqlWriter {}
    }
}
