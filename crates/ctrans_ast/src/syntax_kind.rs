//! SyntaxKind enum - all token and node kinds in the C AST.

/// The kind of a syntax token or node in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown = 0,
    EndOfFileToken = 1,

    // Literals
    IntegerLiteral = 2,

    // Identifiers
    Identifier = 3,

    // Punctuation
    OpenBraceToken = 4,
    CloseBraceToken = 5,
    OpenParenToken = 6,
    CloseParenToken = 7,
    SemicolonToken = 8,
    CommaToken = 9,
    LessThanToken = 10,
    GreaterThanToken = 11,
    LessThanEqualsToken = 12,
    GreaterThanEqualsToken = 13,
    EqualsEqualsToken = 14,
    ExclamationEqualsToken = 15,
    PlusToken = 16,
    MinusToken = 17,
    AsteriskToken = 18,
    SlashToken = 19,
    PercentToken = 20,
    AmpersandAmpersandToken = 21,
    BarBarToken = 22,
    ExclamationToken = 23,
    EqualsToken = 24,

    // Keywords
    ElseKeyword = 25,
    IfKeyword = 26,
    IntKeyword = 27,
    ReturnKeyword = 28,
    TypedefKeyword = 29,
    WhileKeyword = 30,

    // ========================================================================
    // Nodes
    // ========================================================================
    TranslationUnit = 31,
    FunctionDefinition = 32,
    DirectDeclarator = 33,
    ParameterDeclaration = 34,
    Declaration = 35,
    InitDeclarator = 36,
    TypedefDeclaration = 37,
    TypeSpecifier = 38,

    // Statements
    CompoundStatement = 39,
    ExpressionStatement = 40,
    ReturnStatement = 41,
    IfStatement = 42,
    WhileStatement = 43,
    EmptyStatement = 44,

    // Expressions
    BinaryExpression = 45,
    UnaryExpression = 46,
    AssignmentExpression = 47,
    CallExpression = 48,
    ParenthesizedExpression = 49,
}

impl SyntaxKind {
    pub const FIRST_BINARY_OPERATOR: SyntaxKind = SyntaxKind::LessThanToken;
    pub const LAST_BINARY_OPERATOR: SyntaxKind = SyntaxKind::BarBarToken;
}

impl SyntaxKind {
    /// Whether this kind is an operator that may appear between two operands.
    /// `=` is excluded; assignment is parsed separately.
    #[inline]
    pub fn is_binary_operator(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::FIRST_BINARY_OPERATOR as u16
            && v <= SyntaxKind::LAST_BINARY_OPERATOR as u16
    }

    /// Whether this kind may prefix an operand.
    #[inline]
    pub fn is_unary_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::PlusToken | SyntaxKind::MinusToken | SyntaxKind::ExclamationToken
        )
    }

    /// Whether this token can start a type specifier without consulting the
    /// typedef names in scope.
    #[inline]
    pub fn is_type_keyword(self) -> bool {
        matches!(self, SyntaxKind::IntKeyword)
    }

    /// Look up a keyword from its text.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "else" => Some(SyntaxKind::ElseKeyword),
            "if" => Some(SyntaxKind::IfKeyword),
            "int" => Some(SyntaxKind::IntKeyword),
            "return" => Some(SyntaxKind::ReturnKeyword),
            "typedef" => Some(SyntaxKind::TypedefKeyword),
            "while" => Some(SyntaxKind::WhileKeyword),
            _ => None,
        }
    }

    /// The fixed source text of a punctuation or keyword token.
    pub fn token_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::IntKeyword => "int",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::TypedefKeyword => "typedef",
            SyntaxKind::WhileKeyword => "while",
            _ => return None,
        };
        Some(text)
    }
}
