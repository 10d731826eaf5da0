//! ctrans_parser: Recursive descent parser for the supported C89 subset.
//!
//! Parses token streams from the scanner into an arena-allocated AST.

mod parser;
mod precedence;
mod utilities;

pub use parser::Parser;
