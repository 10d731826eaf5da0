//! Parser utility functions.

use ctrans_ast::syntax_kind::SyntaxKind;

/// Check if a token kind can start a statement other than an expression
/// statement. Used as a resynchronisation point after a parse error.
pub fn can_start_statement(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::OpenBraceToken
            | SyntaxKind::IntKeyword
            | SyntaxKind::TypedefKeyword
            | SyntaxKind::ReturnKeyword
            | SyntaxKind::IfKeyword
            | SyntaxKind::WhileKeyword
    )
}

/// Check if a token kind can start a top-level declaration.
pub fn can_start_external_declaration(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::IntKeyword | SyntaxKind::TypedefKeyword)
}
