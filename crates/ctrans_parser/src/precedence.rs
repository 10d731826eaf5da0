//! Operator precedence for binary operators.

use ctrans_ast::syntax_kind::SyntaxKind;

/// Operator precedence levels, lowest first. Assignment binds looser than
/// all of these and is parsed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    Equality = 3,
    Relational = 4,
    Additive = 5,
    Multiplicative = 6,
    Invalid = 255,
}

/// Get the binary operator precedence for a given token kind.
pub fn get_binary_operator_precedence(kind: SyntaxKind) -> OperatorPrecedence {
    match kind {
        SyntaxKind::BarBarToken => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => OperatorPrecedence::LogicalAnd,
        SyntaxKind::EqualsEqualsToken | SyntaxKind::ExclamationEqualsToken => {
            OperatorPrecedence::Equality
        }
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken => OperatorPrecedence::Relational,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        _ => OperatorPrecedence::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_binary_operator_has_a_precedence() {
        let operators = [
            SyntaxKind::LessThanToken,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::LessThanEqualsToken,
            SyntaxKind::GreaterThanEqualsToken,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::PlusToken,
            SyntaxKind::MinusToken,
            SyntaxKind::AsteriskToken,
            SyntaxKind::SlashToken,
            SyntaxKind::PercentToken,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::BarBarToken,
        ];
        for kind in operators {
            assert!(kind.is_binary_operator());
            assert_ne!(get_binary_operator_precedence(kind), OperatorPrecedence::Invalid);
        }
        assert_eq!(
            get_binary_operator_precedence(SyntaxKind::EqualsToken),
            OperatorPrecedence::Invalid
        );
    }

    #[test]
    fn test_relative_order() {
        use OperatorPrecedence::*;
        assert!(LogicalOr < LogicalAnd);
        assert!(Equality < Relational);
        assert!(Additive < Multiplicative);
    }
}
