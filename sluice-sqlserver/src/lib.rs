mod driver;
mod sql_writer;

pub use driver::*;
pub use sql_writer::*;
