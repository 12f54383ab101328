use crate::Error;
use std::borrow::Cow;

/// Failures raised by sluice itself, carried inside [`Error`](crate::Error).
///
/// Recover the kind with `error.downcast_ref::<ErrorKind>()`. Driver and I/O
/// errors are passed through untouched and will not downcast to this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// The entity description cannot support the requested operation
    /// (missing or ambiguous primary key, more than one row version column).
    #[error("Schema error on `{table}`: {message}")]
    Schema {
        table: Cow<'static, str>,
        message: String,
    },
    /// An expression or relationship could not be mapped to the known tables.
    #[error("Mapping error: {0}")]
    Mapping(String),
    /// The row version stored by the caller no longer matches the database.
    #[error(
        "Optimistic concurrency check failed on `{table}`: the row was modified or deleted by another writer"
    )]
    OptimisticConcurrency { table: Cow<'static, str> },
}

impl ErrorKind {
    pub fn schema(table: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Error {
        ErrorKind::Schema {
            table: table.into(),
            message: message.into(),
        }
        .into()
    }
    pub fn mapping(message: impl Into<String>) -> Error {
        ErrorKind::Mapping(message.into()).into()
    }
    pub fn optimistic_concurrency(table: impl Into<Cow<'static, str>>) -> Error {
        ErrorKind::OptimisticConcurrency {
            table: table.into(),
        }
        .into()
    }
    /// Extract the kind from an error, when it was raised by sluice.
    pub fn of(error: &Error) -> Option<&ErrorKind> {
        error.downcast_ref::<ErrorKind>()
    }
}
