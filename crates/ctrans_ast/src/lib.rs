//! ctrans_ast: Abstract Syntax Tree definitions for the C translator.
//!
//! This module defines the closed set of AST node types for the supported
//! C89 subset and the SyntaxKind enum shared with the scanner.

pub mod generated;
pub mod node;
pub mod syntax_kind;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
