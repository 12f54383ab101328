mod context;
mod fold;
mod sql_writer;

pub use context::*;
pub use fold::{evaluate_binary, negate, values_equal};
pub use sql_writer::*;
