pub mod diagnostics;
pub mod parser;
pub mod surface;

pub use parser::{parse_program, parse_term, ParseError};
pub use surface::*;
