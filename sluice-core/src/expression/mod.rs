mod expr;
mod op;

pub use expr::*;
pub use op::*;
