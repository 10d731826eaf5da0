//! Python translation.
//!
//! Each node writes its own Python text through [`Emit`]. Blocks are
//! rendered by indentation, so a body that produces no text gets `pass`.

use crate::context::EmitContext;
use crate::error::EmitResult;
use crate::Emit;
use ctrans_ast::node::*;
use ctrans_ast::syntax_kind::SyntaxKind;
use std::io::Write;

const TRAILER: &str = "# Invoke main as the starting point\n\
if __name__ == \"__main__\":\n\
\timport sys\n\
\tret=main()\n\
\tsys.exit(ret)\n";

impl Emit for TranslationUnit<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        for item in self.items {
            item.emit(cx, out)?;
        }
        if cx.options().emit_trailer {
            out.write_all(TRAILER.as_bytes())?;
        }
        Ok(())
    }
}

impl Emit for ExternalDeclaration<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        match self {
            ExternalDeclaration::Function(n) => n.emit(cx, out),
            ExternalDeclaration::Declaration(n) => n.emit(cx, out),
            ExternalDeclaration::Typedef(n) => n.emit(cx, out),
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

impl Emit for FunctionDefinition<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        cx.resolve_type(&self.specifier)?;
        log::debug!("emitting function `{}`", self.declarator.name.text_name);

        cx.write_indent(out)?;
        out.write_all(b"def ")?;
        cx.enter_function();
        self.declarator.emit(cx, out)?;

        cx.indent();
        let mut body = Vec::new();
        emit_statements(self.body.statements, cx, &mut body)?;

        // The set of rebound names is only complete once the body is walked.
        let globals = cx.visible_globals();
        if !globals.is_empty() {
            cx.write_indent(out)?;
            writeln!(out, "global {}", globals.join(", "))?;
        }
        if body.is_empty() && globals.is_empty() {
            write_pass(cx, out)?;
        }
        out.write_all(&body)?;
        cx.dedent();

        cx.leave_scope()
    }
}

impl Emit for DirectDeclarator<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        write!(out, "{}(", self.name.text_name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                out.write_all(b", ")?;
            }
            parameter.emit(cx, out)?;
        }
        out.write_all(b"):\n")?;
        Ok(())
    }
}

impl Emit for ParameterDeclaration {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        let ty = cx.resolve_type(&self.specifier)?;
        let chunk = cx.declare_chunk(&self.name, ty);
        let python = cx.python_name(&self.name, &chunk);
        out.write_all(python.as_bytes())?;
        Ok(())
    }
}

/// One `name = value` line per declarator. Each name is in scope for its
/// own initializer and everything after it.
impl Emit for Declaration<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        let ty = cx.resolve_type(&self.specifier)?;
        for declarator in self.declarators {
            let chunk = cx.declare_chunk(&declarator.name, ty.clone());
            let python = cx.python_name(&declarator.name, &chunk);
            cx.write_indent(out)?;
            write!(out, "{} = ", python)?;
            match declarator.initializer {
                Some(init) => init.emit(cx, out)?,
                None => out.write_all(b"0")?,
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Typedefs only bind a name; nothing is written.
impl Emit for TypedefDeclaration {
    fn emit(&self, cx: &mut EmitContext<'_>, _out: &mut dyn Write) -> EmitResult<()> {
        let ty = cx.resolve_type(&self.specifier)?;
        cx.declare_type(&self.name, ty);
        Ok(())
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A nested block. Python has no block scope, so the statements are
/// written at the current indentation inside a fresh C scope.
impl Emit for CompoundStatement<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        cx.enter_scope();
        emit_statements(self.statements, cx, out)?;
        cx.leave_scope()
    }
}

impl Emit for Statement<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        match self {
            Statement::Compound(n) => n.emit(cx, out),
            Statement::Declaration(n) => n.emit(cx, out),
            Statement::Typedef(n) => n.emit(cx, out),
            Statement::Expression(n) => {
                cx.write_indent(out)?;
                emit_assignment_chain(n.expression, cx, out)?;
                out.write_all(b"\n")?;
                Ok(())
            }
            Statement::Return(n) => {
                cx.write_indent(out)?;
                out.write_all(b"return")?;
                if let Some(expression) = n.expression {
                    out.write_all(b" ")?;
                    expression.emit(cx, out)?;
                }
                out.write_all(b"\n")?;
                Ok(())
            }
            Statement::If(n) => {
                cx.write_indent(out)?;
                emit_if(n, cx, out)
            }
            Statement::While(n) => {
                cx.write_indent(out)?;
                out.write_all(b"while ")?;
                n.condition.emit(cx, out)?;
                out.write_all(b":\n")?;
                emit_nested(n.body, cx, out)
            }
            Statement::Empty(_) => Ok(()),
        }
    }
}

fn emit_statements(
    statements: &[Statement<'_>],
    cx: &mut EmitContext<'_>,
    out: &mut dyn Write,
) -> EmitResult<()> {
    for statement in statements {
        statement.emit(cx, out)?;
    }
    Ok(())
}

/// `if` with `else if` chains collapsed to `elif`. The indentation for the
/// first keyword is already written.
fn emit_if(node: &IfStatement<'_>, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
    out.write_all(b"if ")?;
    node.condition.emit(cx, out)?;
    out.write_all(b":\n")?;
    emit_nested(node.then_statement, cx, out)?;

    match node.else_statement {
        Some(Statement::If(next)) => {
            cx.write_indent(out)?;
            out.write_all(b"el")?;
            emit_if(next, cx, out)
        }
        Some(other) => {
            cx.write_indent(out)?;
            out.write_all(b"else:\n")?;
            emit_nested(other, cx, out)
        }
        None => Ok(()),
    }
}

/// Write `statement` one level deeper, or `pass` if it produces nothing.
fn emit_nested(statement: &Statement<'_>, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
    cx.indent();
    let mut body = Vec::new();
    statement.emit(cx, &mut body)?;
    if body.is_empty() {
        write_pass(cx, out)?;
    } else {
        out.write_all(&body)?;
    }
    cx.dedent();
    Ok(())
}

fn write_pass(cx: &EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
    cx.write_indent(out)?;
    out.write_all(b"pass\n")?;
    Ok(())
}

// ============================================================================
// Expressions
// ============================================================================

/// At statement level `a = b = 3` stays a chained assignment; anywhere else
/// an assignment becomes an assignment expression.
fn emit_assignment_chain(
    expression: &Expression<'_>,
    cx: &mut EmitContext<'_>,
    out: &mut dyn Write,
) -> EmitResult<()> {
    match expression {
        Expression::Assignment(n) => {
            let target = cx.resolve_name(&n.target)?;
            write!(out, "{} = ", target)?;
            emit_assignment_chain(n.value, cx, out)
        }
        other => other.emit(cx, out),
    }
}

impl Emit for Expression<'_> {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()> {
        match self {
            Expression::IntegerLiteral(n) => write!(out, "{}", n.value)?,
            Expression::Identifier(n) => {
                let python = cx.resolve_name(n)?;
                out.write_all(python.as_bytes())?;
            }
            Expression::Binary(n) => {
                emit_operand(n.left, n.operator, cx, out)?;
                write!(out, " {} ", binary_operator(n.operator))?;
                emit_operand(n.right, n.operator, cx, out)?;
            }
            Expression::Unary(n) => match n.operator {
                SyntaxKind::ExclamationToken => {
                    out.write_all(b"(not ")?;
                    n.operand.emit(cx, out)?;
                    out.write_all(b")")?;
                }
                operator => {
                    out.write_all(operator.token_text().unwrap_or_default().as_bytes())?;
                    n.operand.emit(cx, out)?;
                }
            },
            Expression::Assignment(n) => {
                let target = cx.resolve_name(&n.target)?;
                write!(out, "({} := ", target)?;
                n.value.emit(cx, out)?;
                out.write_all(b")")?;
            }
            Expression::Call(n) => {
                write!(out, "{}(", n.callee.text_name)?;
                for (i, argument) in n.arguments.iter().enumerate() {
                    if i > 0 {
                        out.write_all(b", ")?;
                    }
                    argument.emit(cx, out)?;
                }
                out.write_all(b")")?;
            }
            Expression::Parenthesized(n) => {
                out.write_all(b"(")?;
                n.expression.emit(cx, out)?;
                out.write_all(b")")?;
            }
        }
        Ok(())
    }
}

/// Python chains comparisons (`a < b < c` tests both), C does not; a
/// comparison directly under another comparison is parenthesized.
fn emit_operand(
    operand: &Expression<'_>,
    parent: SyntaxKind,
    cx: &mut EmitContext<'_>,
    out: &mut dyn Write,
) -> EmitResult<()> {
    let chained = is_comparison(parent)
        && matches!(operand, Expression::Binary(inner) if is_comparison(inner.operator));
    if chained {
        out.write_all(b"(")?;
        operand.emit(cx, out)?;
        out.write_all(b")")?;
        Ok(())
    } else {
        operand.emit(cx, out)
    }
}

fn is_comparison(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
    )
}

fn binary_operator(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::SlashToken => "//",
        SyntaxKind::AmpersandAmpersandToken => "and",
        SyntaxKind::BarBarToken => "or",
        other => other.token_text().unwrap_or("?"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_mapping() {
        assert_eq!(binary_operator(SyntaxKind::SlashToken), "//");
        assert_eq!(binary_operator(SyntaxKind::AmpersandAmpersandToken), "and");
        assert_eq!(binary_operator(SyntaxKind::BarBarToken), "or");
        assert_eq!(binary_operator(SyntaxKind::PercentToken), "%");
        assert_eq!(binary_operator(SyntaxKind::LessThanEqualsToken), "<=");
    }

    #[test]
    fn test_comparisons() {
        assert!(is_comparison(SyntaxKind::EqualsEqualsToken));
        assert!(!is_comparison(SyntaxKind::PlusToken));
        assert!(!is_comparison(SyntaxKind::AmpersandAmpersandToken));
    }

    #[test]
    fn test_trailer_text() {
        assert!(TRAILER.starts_with("# Invoke main as the starting point\n"));
        assert!(TRAILER.contains("\tret=main()\n"));
        assert!(TRAILER.ends_with("\tsys.exit(ret)\n"));
    }
}
