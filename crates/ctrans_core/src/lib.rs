//! ctrans_core: Core utilities for the ctrans C translator.
//!
//! Provides string interning and source text spans used throughout the
//! translation pipeline.

pub mod intern;
pub mod text;

// Re-export commonly used types
pub use intern::{InternedString, StringInterner};
pub use text::{LineMap, TextRange, TextSpan};
