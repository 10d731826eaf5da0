//! Accessor helpers for AST node enums.

use crate::node::*;
use crate::syntax_kind::SyntaxKind;

/// Helper to get the NodeData from any external declaration.
impl<'a> ExternalDeclaration<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            ExternalDeclaration::Function(n) => &n.data,
            ExternalDeclaration::Declaration(n) => &n.data,
            ExternalDeclaration::Typedef(n) => &n.data,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }
}

/// Helper to get the NodeData from any statement.
impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::Compound(n) => &n.data,
            Statement::Declaration(n) => &n.data,
            Statement::Typedef(n) => &n.data,
            Statement::Expression(n) => &n.data,
            Statement::Return(n) => &n.data,
            Statement::If(n) => &n.data,
            Statement::While(n) => &n.data,
            Statement::Empty(d) => d,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn pos(&self) -> u32 {
        self.data().range.pos
    }

    pub fn end(&self) -> u32 {
        self.data().range.end
    }
}

/// Helper to get the NodeData from any expression.
impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::IntegerLiteral(n) => &n.data,
            Expression::Identifier(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Unary(n) => &n.data,
            Expression::Assignment(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::Parenthesized(n) => &n.data,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn pos(&self) -> u32 {
        self.data().range.pos
    }

    pub fn end(&self) -> u32 {
        self.data().range.end
    }
}
