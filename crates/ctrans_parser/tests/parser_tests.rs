//! Parser integration tests.
//!
//! Verifies that the parser correctly builds AST structures from C source.

use bumpalo::Bump;
use ctrans_ast::node::*;
use ctrans_ast::syntax_kind::SyntaxKind;
use ctrans_diagnostics::DiagnosticCollection;
use ctrans_parser::Parser;

/// Helper: parse source text and return the number of top-level items and
/// the diagnostics.
fn parse(source: &str) -> (usize, DiagnosticCollection) {
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.c", source);
    let unit = parser.parse_translation_unit();
    (unit.items.len(), parser.take_diagnostics())
}

/// Helper: assert that parsing succeeds with the expected number of top-level items.
fn assert_item_count(source: &str, expected: usize) {
    let (count, diags) = parse(source);
    assert!(diags.is_empty(), "source: {}\n{}", source, diags);
    assert_eq!(count, expected, "source: {}", source);
}

/// Helper: parse `int f() { <body> }` and hand the body's statements to `check`.
fn with_body(body: &str, check: impl FnOnce(&[Statement<'_>])) {
    let source = format!("int f() {{ {} }}", body);
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.c", &source);
    let unit = parser.parse_translation_unit();
    let diags = parser.take_diagnostics();
    assert!(diags.is_empty(), "source: {}\n{}", source, diags);
    match &unit.items[0] {
        ExternalDeclaration::Function(f) => check(f.body.statements),
        other => panic!("expected a function, got {:?}", other.kind()),
    }
}

/// Helper: the expression of `return <expr>;`.
fn with_return_expr(expr: &str, check: impl FnOnce(&Expression<'_>)) {
    with_body(&format!("return {};", expr), |stmts| match &stmts[0] {
        Statement::Return(ReturnStatement {
            expression: Some(e),
            ..
        }) => check(e),
        other => panic!("expected return, got {:?}", other.kind()),
    });
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_parse_empty_file() {
    assert_item_count("", 0);
}

#[test]
fn test_parse_global_declaration() {
    assert_item_count("int x;", 1);
}

#[test]
fn test_parse_multiple_declarators() {
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.c", "int a, b = 2, c;");
    let unit = parser.parse_translation_unit();
    assert!(parser.take_diagnostics().is_empty());
    let ExternalDeclaration::Declaration(decl) = &unit.items[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(decl.declared_var_names(), vec!["a", "b", "c"]);
    assert!(decl.declarators[0].initializer.is_none());
    assert!(matches!(
        decl.declarators[1].initializer,
        Some(Expression::IntegerLiteral(IntegerLiteral { value: 2, .. }))
    ));
    assert!(decl.specifier.is_builtin());
}

#[test]
fn test_parse_typedef_then_use() {
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.c", "typedef int word; word w;");
    let unit = parser.parse_translation_unit();
    assert!(parser.take_diagnostics().is_empty());
    assert_eq!(unit.items.len(), 2);

    let ExternalDeclaration::Typedef(td) = &unit.items[0] else {
        panic!("expected a typedef");
    };
    assert_eq!(td.name.text_name, "word");
    assert_eq!(td.specifier.name.text_name, "int");

    let ExternalDeclaration::Declaration(decl) = &unit.items[1] else {
        panic!("expected a declaration");
    };
    assert_eq!(decl.specifier.name.text_name, "word");
    assert_eq!(decl.specifier.data.kind, SyntaxKind::Identifier);
    assert!(!decl.specifier.is_builtin());
}

#[test]
fn test_identifiers_share_the_interner() {
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.c", "int x; int f() { return x; }");
    let unit = parser.parse_translation_unit();
    let ExternalDeclaration::Declaration(decl) = &unit.items[0] else {
        panic!("expected a declaration");
    };
    let x = decl.declarators[0].name.text;
    assert_eq!(parser.interner().resolve(x), "x");
    assert_eq!(parser.interner().get("x"), Some(x));
}

// ============================================================================
// Function Definitions
// ============================================================================

#[test]
fn test_parse_function_definition() {
    assert_item_count("int main() { return 0; }", 1);
}

#[test]
fn test_parse_function_with_params() {
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.c", "int add(int a, int b) { return a + b; }");
    let unit = parser.parse_translation_unit();
    assert!(parser.take_diagnostics().is_empty());
    let ExternalDeclaration::Function(f) = &unit.items[0] else {
        panic!("expected a function");
    };
    assert_eq!(f.declarator.name.text_name, "add");
    let names: Vec<&str> = f
        .declarator
        .parameters
        .iter()
        .map(|p| p.name.text_name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(f.body.statements.len(), 1);
}

#[test]
fn test_parse_mixed_top_level() {
    assert_item_count(
        "int g; typedef int word; int f(word w) { return w; } int h = 3;",
        4,
    );
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_statement_kinds() {
    with_body(
        "int x = 1; { x = 2; } ; if (x) x = 3; else x = 4; while (x) x = x - 1; return;",
        |stmts| {
            let kinds: Vec<SyntaxKind> = stmts.iter().map(|s| s.kind()).collect();
            assert_eq!(
                kinds,
                vec![
                    SyntaxKind::Declaration,
                    SyntaxKind::CompoundStatement,
                    SyntaxKind::EmptyStatement,
                    SyntaxKind::IfStatement,
                    SyntaxKind::WhileStatement,
                    SyntaxKind::ReturnStatement,
                ]
            );
        },
    );
}

#[test]
fn test_dangling_else_binds_to_inner_if() {
    with_body("if (a) if (b) return 1; else return 2;", |stmts| {
        let Statement::If(outer) = &stmts[0] else {
            panic!("expected if");
        };
        assert!(outer.else_statement.is_none());
        let Statement::If(inner) = outer.then_statement else {
            panic!("expected nested if");
        };
        assert!(inner.else_statement.is_some());
    });
}

#[test]
fn test_typedef_name_starts_local_declaration() {
    with_body("typedef int word; word w; w = 1;", |stmts| {
        assert_eq!(stmts[0].kind(), SyntaxKind::TypedefDeclaration);
        assert_eq!(stmts[1].kind(), SyntaxKind::Declaration);
        assert_eq!(stmts[2].kind(), SyntaxKind::ExpressionStatement);
    });
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_multiplicative_binds_tighter() {
    with_return_expr("1 + 2 * 3", |e| {
        let Expression::Binary(add) = e else {
            panic!("expected binary");
        };
        assert_eq!(add.operator, SyntaxKind::PlusToken);
        assert!(matches!(
            add.right,
            Expression::Binary(BinaryExpression {
                operator: SyntaxKind::AsteriskToken,
                ..
            })
        ));
    });
}

#[test]
fn test_binary_is_left_associative() {
    with_return_expr("a - b - c", |e| {
        let Expression::Binary(outer) = e else {
            panic!("expected binary");
        };
        assert!(matches!(outer.right, Expression::Identifier(id) if id.text_name == "c"));
        assert!(matches!(outer.left, Expression::Binary(_)));
    });
}

#[test]
fn test_logical_precedence() {
    with_return_expr("a || b && c == d", |e| {
        let Expression::Binary(or) = e else {
            panic!("expected binary");
        };
        assert_eq!(or.operator, SyntaxKind::BarBarToken);
        let Expression::Binary(and) = or.right else {
            panic!("expected binary");
        };
        assert_eq!(and.operator, SyntaxKind::AmpersandAmpersandToken);
    });
}

#[test]
fn test_unary_call_and_parens() {
    with_return_expr("!f(1, x) + -(y)", |e| {
        let Expression::Binary(add) = e else {
            panic!("expected binary");
        };
        let Expression::Unary(not) = add.left else {
            panic!("expected unary");
        };
        assert_eq!(not.operator, SyntaxKind::ExclamationToken);
        let Expression::Call(call) = not.operand else {
            panic!("expected call");
        };
        assert_eq!(call.callee.text_name, "f");
        assert_eq!(call.arguments.len(), 2);
        let Expression::Unary(neg) = add.right else {
            panic!("expected unary");
        };
        assert!(matches!(neg.operand, Expression::Parenthesized(_)));
    });
}

#[test]
fn test_assignment_is_right_associative() {
    with_body("a = b = 3;", |stmts| {
        let Statement::Expression(stmt) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let Expression::Assignment(outer) = stmt.expression else {
            panic!("expected assignment");
        };
        assert_eq!(outer.target.text_name, "a");
        assert!(matches!(outer.value, Expression::Assignment(inner) if inner.target.text_name == "b"));
    });
}

#[test]
fn test_integer_literal_values() {
    with_return_expr("0x10", |e| {
        assert!(matches!(e, Expression::IntegerLiteral(lit) if lit.value == 16 && lit.text == "0x10"));
    });
    with_return_expr("010", |e| {
        assert!(matches!(e, Expression::IntegerLiteral(lit) if lit.value == 8));
    });
}

// ============================================================================
// Error Recovery
// ============================================================================

#[test]
fn test_missing_semicolon_reported() {
    let (_, diags) = parse("int x = 1 int y;");
    assert!(diags.has_errors());
    assert!(diags
        .diagnostics()
        .iter()
        .any(|d| d.message_text == "';' expected."));
}

#[test]
fn test_recovers_at_next_statement() {
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.c", "int f() { ) ; return 1; }");
    let unit = parser.parse_translation_unit();
    let diags = parser.take_diagnostics();
    assert!(diags.has_errors());
    let ExternalDeclaration::Function(f) = &unit.items[0] else {
        panic!("expected a function");
    };
    assert_eq!(
        f.body.statements.last().map(|s| s.kind()),
        Some(SyntaxKind::ReturnStatement)
    );
}

#[test]
fn test_top_level_garbage() {
    let (count, diags) = parse("x = 5; int y;");
    assert_eq!(count, 1);
    assert_eq!(diags.diagnostics()[0].code, 1105);
}

#[test]
fn test_invalid_assignment_target() {
    let (_, diags) = parse("int f() { 1 = 2; }");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.diagnostics()[0].code, 1106);
}

#[test]
fn test_scanner_diagnostics_are_merged() {
    let (_, diags) = parse("int x = 09;");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.diagnostics()[0].code, 1003);
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 500;
    let source = format!("int f() {{ return {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
    let (_, diags) = parse(&source);
    assert!(diags.diagnostics().iter().any(|d| d.code == 1107));
}

#[test]
fn test_long_assignment_chain_does_not_overflow() {
    let source = format!("int f() {{ int a; a = {}0; return a; }}", "a = ".repeat(10_000));
    let (count, diags) = parse(&source);
    assert_eq!(count, 1);
    assert!(diags.diagnostics().iter().any(|d| d.code == 1107));
}

#[test]
fn test_invalid_assignment_chain_does_not_overflow() {
    let source = format!("int f() {{ {}1; }}", "1 = ".repeat(10_000));
    let (_, diags) = parse(&source);
    assert!(diags.diagnostics().iter().any(|d| d.code == 1107));
}

#[test]
fn test_unclosed_function_body() {
    let (count, diags) = parse("int main() { return 0;");
    assert_eq!(count, 1);
    assert!(diags
        .diagnostics()
        .iter()
        .any(|d| d.message_text == "'}' expected."));
}
