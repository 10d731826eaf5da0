//! ctrans_diagnostics: Diagnostic messages and error reporting.
//!
//! Scanner, parser and translation errors are collected as `Diagnostic`
//! values instead of aborting, so a driver can report every problem found in
//! a translation unit before deciding whether to emit output.

use ctrans_core::text::{LineMap, TextSpan};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A message template with a stable code.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// May contain `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic that is not tied to a source location.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: String,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    /// Render as `file:line:col: error C0000: text`, with 1-based line and column.
    pub fn render(&self, line_map: &LineMap) -> String {
        let mut out = String::new();
        if let Some(ref file) = self.file {
            out.push_str(file);
            if let Some(span) = self.span {
                let lc = line_map.line_and_column_of(span.start);
                out.push_str(&format!(":{}:{}", lc.line + 1, lc.column + 1));
            }
            out.push_str(": ");
        }
        out.push_str(&format!("{} C{:04}: {}", self.category, self.code, self.message_text));
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} C{:04}: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, ... in `template` with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated while translating one or more units.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort by file, then by position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| {
                    let a_pos = a.span.map(|s| s.start).unwrap_or(0);
                    let b_pos = b.span.map(|s| s.start).unwrap_or(0);
                    a_pos.cmp(&b_pos)
                })
        });
    }
}

impl fmt::Display for DiagnosticCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diag)?;
        }
        Ok(())
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1001, Error, "Invalid character '{0}'.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1002, Error, "Unterminated comment.");
    pub const INVALID_INTEGER_CONSTANT: DiagnosticMessage = diag!(1003, Error, "Invalid integer constant '{0}'.");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1101, Error, "'{0}' expected.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(1102, Error, "Identifier expected.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1103, Error, "Expression expected.");
    pub const TYPE_SPECIFIER_EXPECTED: DiagnosticMessage = diag!(1104, Error, "Type specifier expected.");
    pub const DECLARATION_EXPECTED: DiagnosticMessage = diag!(1105, Error, "Declaration or function definition expected.");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage = diag!(1106, Error, "The left-hand side of an assignment must be a variable.");
    pub const NESTING_TOO_DEEP: DiagnosticMessage = diag!(1107, Error, "Nesting is too deep.");

    // ========================================================================
    // Translation errors (2000-2099)
    // ========================================================================
    pub const _0_UNDECLARED_IDENTIFIER: DiagnosticMessage = diag!(2065, Error, "'{0}': undeclared identifier.");
    pub const _0_IS_NOT_A_TYPE_NAME: DiagnosticMessage = diag!(2061, Error, "'{0}' is not a type name.");
    pub const SCOPE_UNDERFLOW: DiagnosticMessage = diag!(2099, Error, "Internal error: attempted to leave the global scope.");

    // ========================================================================
    // Warnings (9000-9099)
    // ========================================================================
    pub const _0_SHADOWS_AN_OUTER_DECLARATION: DiagnosticMessage = diag!(9001, Warning, "Declaration of '{0}' shadows an outer declaration.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message("'{0}': undeclared identifier.", &["x"]);
        assert_eq!(msg, "'x': undeclared identifier.");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_location(
            "test.c".to_string(),
            TextSpan::new(10, 1),
            &messages::_0_UNDECLARED_IDENTIFIER,
            &["y"],
        );
        let display = diag.to_string();
        assert_eq!(display, "test.c(10): error C2065: 'y': undeclared identifier.");
    }

    #[test]
    fn test_diagnostic_render_uses_line_and_column() {
        let source = "int main() {\n  return y;\n}\n";
        let map = LineMap::new(source);
        let pos = source.find('y').unwrap() as u32;
        let diag = Diagnostic::with_location(
            "main.c".to_string(),
            TextSpan::new(pos, 1),
            &messages::_0_UNDECLARED_IDENTIFIER,
            &["y"],
        );
        assert_eq!(
            diag.render(&map),
            "main.c:2:10: error C2065: 'y': undeclared identifier."
        );
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diag = Diagnostic::new(&messages::SCOPE_UNDERFLOW, &[]);
        assert!(diag.file.is_none());
        assert_eq!(diag.code, 2099);
        assert!(diag.is_error());
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::new(&messages::_0_SHADOWS_AN_OUTER_DECLARATION, &["a"]));
        assert!(!collection.has_errors());
        collection.add(Diagnostic::new(&messages::EXPRESSION_EXPECTED, &[]));
        assert!(collection.has_errors());
        assert_eq!(collection.error_count(), 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_diagnostic_collection_sort() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::with_location(
            "b.c".to_string(),
            TextSpan::new(10, 1),
            &messages::IDENTIFIER_EXPECTED,
            &[],
        ));
        collection.add(Diagnostic::with_location(
            "a.c".to_string(),
            TextSpan::new(20, 1),
            &messages::IDENTIFIER_EXPECTED,
            &[],
        ));
        collection.add(Diagnostic::with_location(
            "a.c".to_string(),
            TextSpan::new(5, 1),
            &messages::EXPRESSION_EXPECTED,
            &[],
        ));
        collection.sort();
        let d = collection.diagnostics();
        assert_eq!(d[0].file.as_deref(), Some("a.c"));
        assert_eq!(d[0].span.map(|s| s.start), Some(5));
        assert_eq!(d[1].span.map(|s| s.start), Some(20));
        assert_eq!(d[2].file.as_deref(), Some("b.c"));
    }
}
