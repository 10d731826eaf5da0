//! The C scanner/lexer.
//!
//! Converts source text into a stream of tokens that the parser consumes.
//! Lexical errors are recorded as diagnostics and scanning continues.

use crate::char_codes::*;
use crate::token::TokenInfo;
use ctrans_ast::syntax_kind::SyntaxKind;
use ctrans_core::text::TextSpan;
use ctrans_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Saved scanner state for lookahead.
pub struct ScannerState {
    pub pos: usize,
    pub token_start: usize,
    pub token: SyntaxKind,
    pub token_value: String,
}

/// The scanner converts C source text into tokens.
pub struct Scanner {
    file_name: String,
    /// The source text being scanned.
    text: String,
    /// Current position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// The text of the current token.
    token_value: String,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(file_name: &str, text: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            text: text.to_string(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Look ahead: save state, call f, restore state and return result.
    ///
    /// Diagnostics raised while looking ahead are discarded; they are
    /// reported again when the tokens are scanned for real.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let diagnostics = std::mem::take(&mut self.diagnostics);
        let result = f(self);
        self.diagnostics = diagnostics;
        self.restore_state(state);
        result
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the current token's text value.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Get the start position of the current token (after trivia).
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Get the current position (end of current token).
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    /// Get the accumulated diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Get a TokenInfo for the current token.
    pub fn token_info(&self) -> TokenInfo {
        TokenInfo::new(self.token, self.token_start as u32, self.pos as u32)
            .with_text(self.token_value.clone())
    }

    /// Save the full scanner state for lookahead.
    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
        }
    }

    /// Restore the full scanner state from a saved state.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
    }

    /// Scan every remaining token up to and including end of file.
    pub fn scan_all(&mut self) -> Vec<TokenInfo> {
        let mut tokens = Vec::new();
        loop {
            let kind = self.scan();
            tokens.push(self.token_info());
            if kind == SyntaxKind::EndOfFileToken {
                return tokens;
            }
        }
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Look at the byte at position pos + offset.
    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn error_at(&mut self, start: usize, end: usize, msg: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            TextSpan::from_bounds(start as u32, end as u32),
            msg,
            args,
        ));
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.byte_at(0) {
            match ch {
                _ if is_line_break(ch) || is_white_space_single_line(ch) => {
                    self.pos += 1;
                }
                b'/' if self.byte_at(1) == Some(b'/') => {
                    let rest = &self.bytes()[self.pos..];
                    let len = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
                    self.pos += len;
                }
                b'/' if self.byte_at(1) == Some(b'*') => {
                    let start = self.pos;
                    let close = memchr::memmem::find(&self.bytes()[start + 2..], b"*/");
                    match close {
                        Some(close) => self.pos = start + 2 + close + 2,
                        None => {
                            self.pos = self.text.len();
                            self.error_at(start, start + 2, &messages::UNTERMINATED_COMMENT, &[]);
                        }
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_value.clear();

        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.byte_at(0) else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            b'(' => { self.pos += 1; SyntaxKind::OpenParenToken }
            b')' => { self.pos += 1; SyntaxKind::CloseParenToken }
            b'{' => { self.pos += 1; SyntaxKind::OpenBraceToken }
            b'}' => { self.pos += 1; SyntaxKind::CloseBraceToken }
            b';' => { self.pos += 1; SyntaxKind::SemicolonToken }
            b',' => { self.pos += 1; SyntaxKind::CommaToken }
            b'+' => { self.pos += 1; SyntaxKind::PlusToken }
            b'-' => { self.pos += 1; SyntaxKind::MinusToken }
            b'*' => { self.pos += 1; SyntaxKind::AsteriskToken }
            b'/' => { self.pos += 1; SyntaxKind::SlashToken }
            b'%' => { self.pos += 1; SyntaxKind::PercentToken }

            b'<' => self.scan_with_equals(SyntaxKind::LessThanToken, SyntaxKind::LessThanEqualsToken),
            b'>' => self.scan_with_equals(SyntaxKind::GreaterThanToken, SyntaxKind::GreaterThanEqualsToken),
            b'=' => self.scan_with_equals(SyntaxKind::EqualsToken, SyntaxKind::EqualsEqualsToken),
            b'!' => self.scan_with_equals(SyntaxKind::ExclamationToken, SyntaxKind::ExclamationEqualsToken),
            b'&' => self.scan_doubled(b'&', SyntaxKind::AmpersandAmpersandToken),
            b'|' => self.scan_doubled(b'|', SyntaxKind::BarBarToken),

            b'0'..=b'9' => self.scan_number(),

            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => self.scan_invalid_character(),
        };

        self.token
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    /// `<` / `<=` and friends.
    fn scan_with_equals(&mut self, single: SyntaxKind, with_equals: SyntaxKind) -> SyntaxKind {
        if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            with_equals
        } else {
            self.pos += 1;
            single
        }
    }

    /// `&&` and `||`; the single-character forms are not part of the
    /// language.
    fn scan_doubled(&mut self, ch: u8, doubled: SyntaxKind) -> SyntaxKind {
        if self.byte_at(1) == Some(ch) {
            self.pos += 2;
            doubled
        } else {
            self.scan_invalid_character()
        }
    }

    fn scan_invalid_character(&mut self) -> SyntaxKind {
        let start = self.pos;
        let ch = self.text[start..].chars().next().unwrap_or('\0');
        self.pos += ch.len_utf8().max(1);
        let text = ch.to_string();
        self.error_at(start, self.pos, &messages::INVALID_CHARACTER, &[&text]);
        self.token_value = text;
        SyntaxKind::Unknown
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        // Consume the whole alphanumeric run so `09` or `12abc` is one bad
        // token rather than a number followed by an identifier.
        while self.byte_at(0).is_some_and(is_identifier_part) {
            self.pos += 1;
        }
        self.token_value = self.text[start..self.pos].to_string();

        if integer_value(&self.token_value).is_none() {
            let text = self.token_value.clone();
            self.error_at(start, self.pos, &messages::INVALID_INTEGER_CONSTANT, &[&text]);
        }
        SyntaxKind::IntegerLiteral
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        while self.byte_at(0).is_some_and(is_identifier_part) {
            self.pos += 1;
        }
        self.token_value = self.text[start..self.pos].to_string();

        SyntaxKind::from_keyword(&self.token_value).unwrap_or(SyntaxKind::Identifier)
    }
}

/// The value of a C integer constant: decimal, `0`-prefixed octal or
/// `0x`-prefixed hexadecimal. `None` if the text is malformed or does not fit
/// in an `i64`.
pub fn integer_value(text: &str) -> Option<i64> {
    let (digits, radix) = match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => (&text[2..], 16),
        [b'0', _, ..] => (&text[1..], 8),
        _ => (text, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_value_radixes() {
        assert_eq!(integer_value("0"), Some(0));
        assert_eq!(integer_value("42"), Some(42));
        assert_eq!(integer_value("017"), Some(15));
        assert_eq!(integer_value("0x1F"), Some(31));
        assert_eq!(integer_value("0XfF"), Some(255));
    }

    #[test]
    fn test_integer_value_rejects_malformed() {
        assert_eq!(integer_value("09"), None);
        assert_eq!(integer_value("0x"), None);
        assert_eq!(integer_value("12abc"), None);
        assert_eq!(integer_value("99999999999999999999"), None);
    }

    #[test]
    fn test_look_ahead_restores_state() {
        let mut scanner = Scanner::new("t.c", "word x;");
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        let next = scanner.look_ahead(|s| s.scan());
        assert_eq!(next, SyntaxKind::Identifier);
        assert_eq!(scanner.token(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "word");
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "x");
    }

    #[test]
    fn test_look_ahead_discards_diagnostics() {
        let mut scanner = Scanner::new("t.c", "a @");
        scanner.scan();
        scanner.look_ahead(|s| s.scan());
        assert!(scanner.diagnostics().is_empty());
        scanner.scan();
        assert_eq!(scanner.diagnostics().len(), 1);
    }
}
