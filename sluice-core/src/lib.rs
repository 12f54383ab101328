mod as_value;
mod convert;
mod driver;
mod entity;
mod error;
mod executor;
mod expression;
mod filter;
mod params;
mod query;
mod reference;
mod schema;
mod statement;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use convert::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use expression::*;
pub use filter::*;
pub use params::*;
pub use query::*;
pub use reference::*;
pub use schema::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub use writer::{
    Context, Fragment, GenericSqlWriter, Pagination, RowVersionStrategy, Scope, SelectParts,
    SqlWriter,
};
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
