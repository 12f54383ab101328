use crate::{GenericSqlWriter, SqlWriter};

/// A database backend: names it and provides its dialect.
pub trait Driver: Send + Sync {
    type SqlWriter: SqlWriter;

    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}

/// Backend writing ANSI flavored SQL, used when no specific dialect is needed.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericDriver;

impl GenericDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for GenericDriver {
    type SqlWriter = GenericSqlWriter;

    const NAME: &'static str = "generic";

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter::new()
    }
}
