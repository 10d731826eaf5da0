//! AST node definitions for the C translator.
//!
//! Nodes reference child nodes via arena-allocated references; lists are
//! arena slices. The tree is immutable once the parser hands it out.

use crate::syntax_kind::SyntaxKind;
use ctrans_core::intern::InternedString;
use ctrans_core::text::TextRange;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    /// The kind of this node.
    pub kind: SyntaxKind,
    /// Source position range.
    pub range: TextRange,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            range: TextRange::new(pos, end),
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

// ============================================================================
// Translation Unit
// ============================================================================

#[derive(Debug)]
pub struct TranslationUnit<'a> {
    pub data: NodeData,
    pub file_name: String,
    pub items: NodeList<'a, ExternalDeclaration<'a>>,
}

/// A top-level item.
#[derive(Debug)]
pub enum ExternalDeclaration<'a> {
    Function(FunctionDefinition<'a>),
    Declaration(Declaration<'a>),
    Typedef(TypedefDeclaration),
}

// ============================================================================
// Identifier
// ============================================================================

#[derive(Debug, Clone)]
pub struct Identifier {
    pub data: NodeData,
    /// The interned text of this identifier.
    pub text: InternedString,
    /// The actual text of this identifier as a plain string.
    pub text_name: String,
}

// ============================================================================
// Declarations
// ============================================================================

/// `int` or a typedef name in specifier position.
///
/// `data.kind` is `IntKeyword` for the keyword and `Identifier` for a
/// typedef name; `name` holds the spelling in both cases.
#[derive(Debug, Clone)]
pub struct TypeSpecifier {
    pub data: NodeData,
    pub name: Identifier,
}

impl TypeSpecifier {
    #[inline]
    pub fn is_builtin(&self) -> bool {
        self.data.kind.is_type_keyword()
    }
}

#[derive(Debug)]
pub struct FunctionDefinition<'a> {
    pub data: NodeData,
    pub specifier: TypeSpecifier,
    pub declarator: DirectDeclarator<'a>,
    pub body: CompoundStatement<'a>,
}

/// A function name and its parameter list.
#[derive(Debug)]
pub struct DirectDeclarator<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub parameters: NodeList<'a, ParameterDeclaration>,
}

#[derive(Debug, Clone)]
pub struct ParameterDeclaration {
    pub data: NodeData,
    pub specifier: TypeSpecifier,
    pub name: Identifier,
}

/// `specifier a, b = 1, c;`
#[derive(Debug)]
pub struct Declaration<'a> {
    pub data: NodeData,
    pub specifier: TypeSpecifier,
    pub declarators: NodeList<'a, InitDeclarator<'a>>,
}

impl<'a> Declaration<'a> {
    /// Names introduced by this declaration, in source order.
    pub fn declared_var_names(&self) -> Vec<&str> {
        self.declarators
            .iter()
            .map(|d| d.name.text_name.as_str())
            .collect()
    }
}

#[derive(Debug)]
pub struct InitDeclarator<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

/// `typedef specifier name;`
#[derive(Debug, Clone)]
pub struct TypedefDeclaration {
    pub data: NodeData,
    pub specifier: TypeSpecifier,
    pub name: Identifier,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Compound(CompoundStatement<'a>),
    Declaration(Declaration<'a>),
    Typedef(TypedefDeclaration),
    Expression(ExpressionStatement<'a>),
    Return(ReturnStatement<'a>),
    If(IfStatement<'a>),
    While(WhileStatement<'a>),
    Empty(NodeData),
}

/// `{ ... }`. Opens a lexical scope.
#[derive(Debug)]
pub struct CompoundStatement<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_statement: OptionalNode<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    IntegerLiteral(IntegerLiteral),
    Identifier(Identifier),
    Binary(BinaryExpression<'a>),
    Unary(UnaryExpression<'a>),
    Assignment(AssignmentExpression<'a>),
    Call(CallExpression<'a>),
    Parenthesized(ParenthesizedExpression<'a>),
}

#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub data: NodeData,
    /// The literal as written (`0x1F`, `017`, `42`).
    pub text: String,
    pub value: i64,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator: SyntaxKind,
    pub right: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

/// `target = value`. Only identifiers are assignable.
#[derive(Debug)]
pub struct AssignmentExpression<'a> {
    pub data: NodeData,
    pub target: Identifier,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub callee: Identifier,
    pub arguments: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct ParenthesizedExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}
