//! The C parser implementation.
//!
//! A recursive descent parser over the scanner's token stream that builds an
//! arena-allocated AST. Errors become diagnostics; the parser resynchronises
//! at the next statement or declaration boundary and keeps going.

use bumpalo::Bump;
use ctrans_ast::node::*;
use ctrans_ast::syntax_kind::SyntaxKind;
use ctrans_core::intern::StringInterner;
use ctrans_core::text::TextSpan;
use ctrans_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use ctrans_scanner::{integer_value, Scanner};

use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};
use crate::utilities::{can_start_external_declaration, can_start_statement};

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

/// Allocate a Vec into the arena as a slice.
///
/// Uses ManuallyDrop to prevent double-free on panic inside alloc_slice_fill_with.
fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    let mut vec = std::mem::ManuallyDrop::new(vec);
    let len = vec.len();
    let ptr = vec.as_ptr();
    let slice = arena.alloc_slice_fill_with(len, |i| {
        // SAFETY: i < len, and each element is read exactly once. ManuallyDrop
        // keeps the Vec destructor from running, so elements are never
        // dropped twice even if this closure panics partway through.
        unsafe { std::ptr::read(ptr.add(i)) }
    });
    // SAFETY: every element has been moved out above.
    unsafe {
        vec.set_len(0);
    }
    slice
}

/// The parser produces a TranslationUnit AST from C source text.
pub struct Parser<'a> {
    arena: &'a Bump,
    scanner: Scanner,
    interner: StringInterner,
    file_name: String,
    source_len: u32,
    /// End of the most recently consumed token.
    last_end: u32,
    diagnostics: DiagnosticCollection,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, file_name: &str, source_text: &str) -> Self {
        Self::with_interner(arena, StringInterner::new(), file_name, source_text)
    }

    /// A parser whose identifiers are interned into `interner`.
    pub fn with_interner(
        arena: &'a Bump,
        interner: StringInterner,
        file_name: &str,
        source_text: &str,
    ) -> Self {
        Self {
            arena,
            scanner: Scanner::new(file_name, source_text),
            interner,
            file_name: file_name.to_string(),
            source_len: source_text.len() as u32,
            last_end: 0,
            diagnostics: DiagnosticCollection::new(),
            recursion_depth: 0,
        }
    }

    pub fn parse_translation_unit(&mut self) -> TranslationUnit<'a> {
        self.next_token();

        let mut items = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken {
            let saved_pos = self.scanner.token_start();
            if let Some(item) = self.parse_external_declaration() {
                items.push(item);
            }
            if self.scanner.token_start() == saved_pos {
                self.skip_to_next_external_declaration();
            }
        }

        TranslationUnit {
            data: NodeData::new(SyntaxKind::TranslationUnit, 0, self.source_len),
            file_name: self.file_name.clone(),
            items: alloc_vec_in(self.arena, items),
        }
    }

    /// Parser and scanner diagnostics, in source order.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.extend(self.scanner.take_diagnostics());
        diagnostics.sort();
        diagnostics
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> SyntaxKind {
        self.last_end = self.scanner.token_end() as u32;
        self.scanner.scan()
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    fn token_end(&self) -> u32 {
        self.scanner.token_end() as u32
    }

    #[inline]
    fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    fn peek_token(&mut self) -> SyntaxKind {
        self.scanner.look_ahead(|s| s.scan())
    }

    fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            let text = kind.token_text().unwrap_or("token");
            self.error(&messages::_0_EXPECTED, &[text]);
            false
        }
    }

    fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn error(&mut self, msg: &DiagnosticMessage, args: &[&str]) {
        let span = TextSpan::from_bounds(self.token_pos(), self.token_end());
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            span,
            msg,
            args,
        ));
    }

    fn enter_nesting(&mut self) -> bool {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error(&messages::NESTING_TOO_DEEP, &[]);
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    fn leave_nesting(&mut self) {
        self.recursion_depth -= 1;
    }

    /// Whether the current token begins a declaration: `int`, or a typedef
    /// name followed by the declared identifier.
    fn is_start_of_declaration(&mut self) -> bool {
        match self.current_token() {
            SyntaxKind::IntKeyword => true,
            SyntaxKind::Identifier => self.peek_token() == SyntaxKind::Identifier,
            _ => false,
        }
    }

    // ========================================================================
    // Error recovery
    // ========================================================================

    /// Skip tokens until one that can start a new statement. A `;` is
    /// consumed. Always makes progress.
    fn skip_to_next_statement(&mut self) {
        loop {
            match self.next_token() {
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => return,
                kind if can_start_statement(kind) => return,
                _ => {}
            }
        }
    }

    /// Top-level counterpart of [`skip_to_next_statement`](Self::skip_to_next_statement).
    fn skip_to_next_external_declaration(&mut self) {
        loop {
            match self.next_token() {
                SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken => {
                    self.next_token();
                    return;
                }
                SyntaxKind::EndOfFileToken => return,
                kind if can_start_external_declaration(kind) => return,
                _ => {}
            }
        }
    }

    // ========================================================================
    // Identifiers and specifiers
    // ========================================================================

    fn make_identifier(&self, text_name: &str, pos: u32, end: u32) -> Identifier {
        Identifier {
            data: NodeData::new(SyntaxKind::Identifier, pos, end),
            text: self.interner.intern(text_name),
            text_name: text_name.to_string(),
        }
    }

    fn parse_identifier(&mut self) -> Identifier {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::Identifier {
            let end = self.token_end();
            let ident = self.make_identifier(self.token_value(), pos, end);
            self.next_token();
            ident
        } else {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            self.make_identifier("", pos, pos)
        }
    }

    fn parse_type_specifier(&mut self) -> TypeSpecifier {
        let pos = self.token_pos();
        let end = self.token_end();
        let kind = self.current_token();
        match kind {
            SyntaxKind::IntKeyword | SyntaxKind::Identifier => {
                let name = self.make_identifier(self.token_value(), pos, end);
                self.next_token();
                TypeSpecifier {
                    data: NodeData::new(kind, pos, end),
                    name,
                }
            }
            _ => {
                self.error(&messages::TYPE_SPECIFIER_EXPECTED, &[]);
                TypeSpecifier {
                    data: NodeData::new(SyntaxKind::TypeSpecifier, pos, pos),
                    name: self.make_identifier("", pos, pos),
                }
            }
        }
    }

    // ========================================================================
    // External declarations
    // ========================================================================

    fn parse_external_declaration(&mut self) -> Option<ExternalDeclaration<'a>> {
        if self.current_token() == SyntaxKind::TypedefKeyword {
            return Some(ExternalDeclaration::Typedef(self.parse_typedef_declaration()));
        }
        if !self.is_start_of_declaration() {
            self.error(&messages::DECLARATION_EXPECTED, &[]);
            return None;
        }

        let pos = self.token_pos();
        let specifier = self.parse_type_specifier();
        let name = self.parse_identifier();
        if self.current_token() == SyntaxKind::OpenParenToken {
            let function = self.parse_function_definition(pos, specifier, name);
            return Some(ExternalDeclaration::Function(function));
        }
        Some(ExternalDeclaration::Declaration(
            self.parse_declaration_rest(pos, specifier, name),
        ))
    }

    fn parse_function_definition(
        &mut self,
        pos: u32,
        specifier: TypeSpecifier,
        name: Identifier,
    ) -> FunctionDefinition<'a> {
        let declarator_pos = name.data.range.pos;
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        if self.current_token() != SyntaxKind::CloseParenToken {
            loop {
                parameters.push(self.parse_parameter_declaration());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        let declarator = DirectDeclarator {
            data: NodeData::new(SyntaxKind::DirectDeclarator, declarator_pos, self.last_end),
            name,
            parameters: alloc_vec_in(self.arena, parameters),
        };

        let body = self.parse_compound_statement();
        FunctionDefinition {
            data: NodeData::new(SyntaxKind::FunctionDefinition, pos, self.last_end),
            specifier,
            declarator,
            body,
        }
    }

    fn parse_parameter_declaration(&mut self) -> ParameterDeclaration {
        let pos = self.token_pos();
        let specifier = self.parse_type_specifier();
        let name = self.parse_identifier();
        ParameterDeclaration {
            data: NodeData::new(SyntaxKind::ParameterDeclaration, pos, self.last_end),
            specifier,
            name,
        }
    }

    fn parse_typedef_declaration(&mut self) -> TypedefDeclaration {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::TypedefKeyword);
        let specifier = self.parse_type_specifier();
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::SemicolonToken);
        TypedefDeclaration {
            data: NodeData::new(SyntaxKind::TypedefDeclaration, pos, self.last_end),
            specifier,
            name,
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_declaration(&mut self) -> Declaration<'a> {
        let pos = self.token_pos();
        let specifier = self.parse_type_specifier();
        let name = self.parse_identifier();
        self.parse_declaration_rest(pos, specifier, name)
    }

    /// Everything after the first declared name: its initializer, the other
    /// init-declarators and the closing `;`.
    fn parse_declaration_rest(
        &mut self,
        pos: u32,
        specifier: TypeSpecifier,
        first: Identifier,
    ) -> Declaration<'a> {
        let mut declarators = vec![self.parse_init_declarator_rest(first)];
        while self.parse_optional(SyntaxKind::CommaToken) {
            let name = self.parse_identifier();
            declarators.push(self.parse_init_declarator_rest(name));
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        Declaration {
            data: NodeData::new(SyntaxKind::Declaration, pos, self.last_end),
            specifier,
            declarators: alloc_vec_in(self.arena, declarators),
        }
    }

    fn parse_init_declarator_rest(&mut self, name: Identifier) -> InitDeclarator<'a> {
        let pos = name.data.range.pos;
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            let expr = self.parse_assignment_expression();
            Some(&*self.arena.alloc(expr))
        } else {
            None
        };
        InitDeclarator {
            data: NodeData::new(SyntaxKind::InitDeclarator, pos, self.last_end),
            name,
            initializer,
        }
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statement(&mut self) -> Statement<'a> {
        if !self.enter_nesting() {
            let pos = self.token_pos();
            self.next_token();
            return Statement::Empty(NodeData::new(SyntaxKind::EmptyStatement, pos, self.last_end));
        }
        let statement = self.parse_statement_worker();
        self.leave_nesting();
        statement
    }

    fn parse_statement_worker(&mut self) -> Statement<'a> {
        match self.current_token() {
            SyntaxKind::SemicolonToken => {
                let pos = self.token_pos();
                self.next_token();
                Statement::Empty(NodeData::new(SyntaxKind::EmptyStatement, pos, self.last_end))
            }
            SyntaxKind::OpenBraceToken => Statement::Compound(self.parse_compound_statement()),
            SyntaxKind::TypedefKeyword => Statement::Typedef(self.parse_typedef_declaration()),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            _ if self.is_start_of_declaration() => Statement::Declaration(self.parse_declaration()),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_compound_statement(&mut self) -> CompoundStatement<'a> {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut statements = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken
            && self.current_token() != SyntaxKind::CloseBraceToken
        {
            let saved_pos = self.scanner.token_start();
            statements.push(self.parse_statement());

            // Error recovery: if the parser hasn't advanced past the same position,
            // skip forward to the next statement-starting token to avoid infinite loops.
            if self.scanner.token_start() == saved_pos {
                self.skip_to_next_statement();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        CompoundStatement {
            data: NodeData::new(SyntaxKind::CompoundStatement, pos, self.last_end),
            statements: alloc_vec_in(self.arena, statements),
        }
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::ReturnKeyword);
        let expression = if self.current_token() == SyntaxKind::SemicolonToken {
            None
        } else {
            let expr = self.parse_expression();
            Some(&*self.arena.alloc(expr))
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        Statement::Return(ReturnStatement {
            data: NodeData::new(SyntaxKind::ReturnStatement, pos, self.last_end),
            expression,
        })
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::IfKeyword);
        let condition = self.parse_parenthesized_condition();
        let then_statement = self.parse_statement();
        let then_statement = &*self.arena.alloc(then_statement);
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            let statement = self.parse_statement();
            Some(&*self.arena.alloc(statement))
        } else {
            None
        };
        Statement::If(IfStatement {
            data: NodeData::new(SyntaxKind::IfStatement, pos, self.last_end),
            condition,
            then_statement,
            else_statement,
        })
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::WhileKeyword);
        let condition = self.parse_parenthesized_condition();
        let body = self.parse_statement();
        Statement::While(WhileStatement {
            data: NodeData::new(SyntaxKind::WhileStatement, pos, self.last_end),
            condition,
            body: self.arena.alloc(body),
        })
    }

    /// `( expression )` after `if` / `while`.
    fn parse_parenthesized_condition(&mut self) -> &'a Expression<'a> {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.arena.alloc(condition)
    }

    fn parse_expression_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::SemicolonToken);
        Statement::Expression(ExpressionStatement {
            data: NodeData::new(SyntaxKind::ExpressionStatement, pos, self.last_end),
            expression: self.arena.alloc(expression),
        })
    }

    // ========================================================================
    // Expression parsing
    // ========================================================================

    fn parse_expression(&mut self) -> Expression<'a> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> Expression<'a> {
        if !self.enter_nesting() {
            return self.skip_too_deep_expression();
        }
        let expr = self.parse_assignment_expression_worker();
        self.leave_nesting();
        expr
    }

    fn parse_assignment_expression_worker(&mut self) -> Expression<'a> {
        if self.current_token() == SyntaxKind::Identifier
            && self.peek_token() == SyntaxKind::EqualsToken
        {
            let target = self.parse_identifier();
            let pos = target.data.range.pos;
            self.next_token();
            let value = self.parse_assignment_expression();
            return Expression::Assignment(AssignmentExpression {
                data: NodeData::new(SyntaxKind::AssignmentExpression, pos, self.last_end),
                target,
                value: self.arena.alloc(value),
            });
        }

        let expr = self.parse_binary_expression(OperatorPrecedence::Lowest);
        if self.current_token() == SyntaxKind::EqualsToken {
            self.error(&messages::INVALID_ASSIGNMENT_TARGET, &[]);
            self.next_token();
            self.parse_assignment_expression();
        }
        expr
    }

    fn parse_binary_expression(&mut self, min_precedence: OperatorPrecedence) -> Expression<'a> {
        let mut left = self.parse_unary_expression();

        loop {
            let precedence = get_binary_operator_precedence(self.current_token());
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }

            let pos = left.pos();
            let operator = self.current_token();
            self.next_token();
            let right = self.parse_binary_expression(precedence);
            let left_ref = self.arena.alloc(left);
            let right_ref = self.arena.alloc(right);
            left = Expression::Binary(BinaryExpression {
                data: NodeData::new(SyntaxKind::BinaryExpression, pos, self.last_end),
                left: left_ref,
                operator,
                right: right_ref,
            });
        }

        left
    }

    fn parse_unary_expression(&mut self) -> Expression<'a> {
        if !self.enter_nesting() {
            return self.skip_too_deep_expression();
        }
        let expr = if self.current_token().is_unary_operator() {
            let pos = self.token_pos();
            let operator = self.current_token();
            self.next_token();
            let operand = self.parse_unary_expression();
            Expression::Unary(UnaryExpression {
                data: NodeData::new(SyntaxKind::UnaryExpression, pos, self.last_end),
                operator,
                operand: self.arena.alloc(operand),
            })
        } else {
            self.parse_primary_expression()
        };
        self.leave_nesting();
        expr
    }

    /// Placeholder for an expression nested past the recursion limit. One
    /// token is consumed so the caller always makes progress.
    fn skip_too_deep_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        if self.current_token() != SyntaxKind::EndOfFileToken {
            self.next_token();
        }
        Expression::Identifier(self.make_identifier("", pos, pos))
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::IntegerLiteral => {
                let text = self.token_value().to_string();
                // Malformed constants were already reported by the scanner.
                let value = integer_value(&text).unwrap_or(0);
                self.next_token();
                Expression::IntegerLiteral(IntegerLiteral {
                    data: NodeData::new(SyntaxKind::IntegerLiteral, pos, self.last_end),
                    text,
                    value,
                })
            }
            SyntaxKind::Identifier => {
                let name = self.parse_identifier();
                if self.current_token() == SyntaxKind::OpenParenToken {
                    self.parse_call_expression(name)
                } else {
                    Expression::Identifier(name)
                }
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                Expression::Parenthesized(ParenthesizedExpression {
                    data: NodeData::new(SyntaxKind::ParenthesizedExpression, pos, self.last_end),
                    expression: self.arena.alloc(inner),
                })
            }
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                Expression::Identifier(self.make_identifier("", pos, pos))
            }
        }
    }

    fn parse_call_expression(&mut self, callee: Identifier) -> Expression<'a> {
        let pos = callee.data.range.pos;
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        if self.current_token() != SyntaxKind::CloseParenToken {
            loop {
                arguments.push(self.parse_assignment_expression());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        Expression::Call(CallExpression {
            data: NodeData::new(SyntaxKind::CallExpression, pos, self.last_end),
            callee,
            arguments: alloc_vec_in(self.arena, arguments),
        })
    }
}
