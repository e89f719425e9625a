pub mod adt;
pub mod ast;
pub mod checker;
pub mod defeq;
pub mod reduce;
pub mod test_support;

pub use ast::*;
