//! ctrans_scanner: Lexer/tokenizer for the supported C89 subset.
//!
//! Produces tokens from source text with support for:
//! - The `int`, `typedef`, `return`, `if`, `else` and `while` keywords
//! - Decimal, octal and hexadecimal integer constants
//! - `//` and `/* */` comments

mod char_codes;
mod scanner;
mod token;

pub use scanner::{integer_value, Scanner};
pub use token::TokenInfo;
