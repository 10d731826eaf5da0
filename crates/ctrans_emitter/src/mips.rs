//! MIPS frame layout.
//!
//! Globals become `.data` words. Each function gets a label and a
//! prologue/epilogue pair whose frame size comes from the scope stack: the
//! peak stack size reached inside the function, relative to the size at
//! entry, plus two words for the saved `$fp` and `$ra`, rounded to a
//! doubleword. Local slots are listed as `$fp`-relative comments.

use crate::context::EmitContext;
use crate::error::EmitResult;
use ctrans_ast::node::*;
use ctrans_ast::syntax_kind::SyntaxKind;
use ctrans_context::WORD_BYTES;
use std::io::Write;

/// Saved `$ra` and `$fp`.
const SAVED_REGISTER_BYTES: u32 = 2 * WORD_BYTES;
const FRAME_ALIGN: u32 = 8;

/// A function's stack frame as laid out by the scope walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub name: String,
    /// Total frame size in bytes, including the saved registers.
    ///
    /// Sized from the peak stack size of the body, not from `get_stack_size`
    /// at scope close: that value is always at or below the peak, since
    /// slots of closed blocks have already been released.
    pub size: u32,
    /// Every parameter and local in declaration order, with its offset
    /// from `$fp`. Slots of sibling blocks may share an offset.
    pub slots: Vec<(String, u32)>,
}

impl FrameLayout {
    fn write(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let size = self.size;
        writeln!(out, "\t.globl {}", self.name)?;
        writeln!(out, "{}:", self.name)?;
        writeln!(out, "\taddiu $sp,$sp,-{}", size)?;
        writeln!(out, "\tsw $ra,{}($sp)", size - WORD_BYTES)?;
        writeln!(out, "\tsw $fp,{}($sp)", size - 2 * WORD_BYTES)?;
        writeln!(out, "\tmove $fp,$sp")?;
        for (name, offset) in &self.slots {
            writeln!(out, "\t# {}: {}($fp)", name, offset)?;
        }
        writeln!(out, "\tmove $sp,$fp")?;
        writeln!(out, "\tlw $ra,{}($sp)", size - WORD_BYTES)?;
        writeln!(out, "\tlw $fp,{}($sp)", size - 2 * WORD_BYTES)?;
        writeln!(out, "\taddiu $sp,$sp,{}", size)?;
        writeln!(out, "\tj $31")?;
        writeln!(out, "\tnop")
    }
}

pub(crate) fn emit_translation_unit(
    unit: &TranslationUnit<'_>,
    cx: &mut EmitContext<'_>,
    out: &mut dyn Write,
) -> EmitResult<()> {
    let mut data = Vec::new();
    let mut text = Vec::new();

    for item in unit.items {
        match item {
            ExternalDeclaration::Declaration(n) => {
                let ty = cx.resolve_type(&n.specifier)?;
                for declarator in n.declarators {
                    cx.declare_chunk(&declarator.name, ty.clone());
                    let value = match declarator.initializer {
                        Some(init) => {
                            walk_expression(init, cx)?;
                            fold_constant(init).unwrap_or_else(|| {
                                log::warn!(
                                    "initializer of `{}` is not constant; emitting 0",
                                    declarator.name.text_name
                                );
                                0
                            })
                        }
                        None => 0,
                    };
                    // Words are 32 bits; wider constants wrap as the C
                    // conversion to int would.
                    writeln!(data, "{}:\t.word {}", declarator.name.text_name, value as i32)?;
                }
            }
            ExternalDeclaration::Typedef(n) => declare_typedef(n, cx)?,
            ExternalDeclaration::Function(n) => {
                let layout = layout_function(n, cx)?;
                layout.write(&mut text)?;
            }
        }
    }

    if !data.is_empty() {
        out.write_all(b"\t.data\n")?;
        out.write_all(&data)?;
    }
    out.write_all(b"\t.text\n")?;
    out.write_all(&text)?;
    Ok(())
}

/// Walk one function through the scope stack and size its frame.
pub fn layout_function(
    function: &FunctionDefinition<'_>,
    cx: &mut EmitContext<'_>,
) -> EmitResult<FrameLayout> {
    cx.resolve_type(&function.specifier)?;
    let name = function.declarator.name.text_name.clone();
    let entry = cx.scopes().get_stack_size();
    let mut slots = Vec::new();

    cx.enter_function();
    for parameter in function.declarator.parameters {
        let ty = cx.resolve_type(&parameter.specifier)?;
        let chunk = cx.declare_chunk(&parameter.name, ty);
        slots.push((parameter.name.text_name.clone(), chunk.offset() - entry));
    }
    for statement in function.body.statements {
        walk_statement(statement, cx, entry, &mut slots)?;
    }

    let live = cx.scopes().get_stack_size();
    let peak = cx.scopes().peak_stack_size();
    debug_assert!(live <= peak);
    log::debug!(
        "function `{}`: stack size {} before leaving its scope, peak {}",
        name,
        live - entry,
        peak - entry
    );
    cx.leave_scope()?;

    let size = round_up(peak - entry + SAVED_REGISTER_BYTES, FRAME_ALIGN);
    Ok(FrameLayout { name, size, slots })
}

fn declare_typedef(node: &TypedefDeclaration, cx: &mut EmitContext<'_>) -> EmitResult<()> {
    let ty = cx.resolve_type(&node.specifier)?;
    cx.declare_type(&node.name, ty);
    Ok(())
}

fn walk_statement(
    statement: &Statement<'_>,
    cx: &mut EmitContext<'_>,
    entry: u32,
    slots: &mut Vec<(String, u32)>,
) -> EmitResult<()> {
    match statement {
        Statement::Compound(n) => {
            cx.enter_scope();
            for inner in n.statements {
                walk_statement(inner, cx, entry, slots)?;
            }
            cx.leave_scope()?;
        }
        Statement::Declaration(n) => {
            let ty = cx.resolve_type(&n.specifier)?;
            for declarator in n.declarators {
                let chunk = cx.declare_chunk(&declarator.name, ty.clone());
                slots.push((declarator.name.text_name.clone(), chunk.offset() - entry));
                if let Some(init) = declarator.initializer {
                    walk_expression(init, cx)?;
                }
            }
        }
        Statement::Typedef(n) => declare_typedef(n, cx)?,
        Statement::Expression(n) => walk_expression(n.expression, cx)?,
        Statement::Return(n) => {
            if let Some(expression) = n.expression {
                walk_expression(expression, cx)?;
            }
        }
        Statement::If(n) => {
            walk_expression(n.condition, cx)?;
            walk_statement(n.then_statement, cx, entry, slots)?;
            if let Some(other) = n.else_statement {
                walk_statement(other, cx, entry, slots)?;
            }
        }
        Statement::While(n) => {
            walk_expression(n.condition, cx)?;
            walk_statement(n.body, cx, entry, slots)?;
        }
        Statement::Empty(_) => {}
    }
    Ok(())
}

/// Resolve every variable the expression uses.
fn walk_expression(expression: &Expression<'_>, cx: &mut EmitContext<'_>) -> EmitResult<()> {
    match expression {
        Expression::IntegerLiteral(_) => {}
        Expression::Identifier(n) => {
            cx.resolve_chunk(n)?;
        }
        Expression::Binary(n) => {
            walk_expression(n.left, cx)?;
            walk_expression(n.right, cx)?;
        }
        Expression::Unary(n) => walk_expression(n.operand, cx)?,
        Expression::Assignment(n) => {
            cx.resolve_chunk(&n.target)?;
            walk_expression(n.value, cx)?;
        }
        Expression::Call(n) => {
            for argument in n.arguments {
                walk_expression(argument, cx)?;
            }
        }
        Expression::Parenthesized(n) => walk_expression(n.expression, cx)?,
    }
    Ok(())
}

/// The value of a constant expression, with C's truncating division.
/// `None` for anything that reads a variable, calls, assigns, divides by
/// zero or overflows.
pub fn fold_constant(expression: &Expression<'_>) -> Option<i64> {
    match expression {
        Expression::IntegerLiteral(n) => Some(n.value),
        Expression::Parenthesized(n) => fold_constant(n.expression),
        Expression::Unary(n) => {
            let value = fold_constant(n.operand)?;
            match n.operator {
                SyntaxKind::MinusToken => value.checked_neg(),
                SyntaxKind::PlusToken => Some(value),
                SyntaxKind::ExclamationToken => Some((value == 0) as i64),
                _ => None,
            }
        }
        Expression::Binary(n) => {
            let left = fold_constant(n.left)?;
            let right = fold_constant(n.right)?;
            match n.operator {
                SyntaxKind::PlusToken => left.checked_add(right),
                SyntaxKind::MinusToken => left.checked_sub(right),
                SyntaxKind::AsteriskToken => left.checked_mul(right),
                SyntaxKind::SlashToken => left.checked_div(right),
                SyntaxKind::PercentToken => left.checked_rem(right),
                SyntaxKind::LessThanToken => Some((left < right) as i64),
                SyntaxKind::GreaterThanToken => Some((left > right) as i64),
                SyntaxKind::LessThanEqualsToken => Some((left <= right) as i64),
                SyntaxKind::GreaterThanEqualsToken => Some((left >= right) as i64),
                SyntaxKind::EqualsEqualsToken => Some((left == right) as i64),
                SyntaxKind::ExclamationEqualsToken => Some((left != right) as i64),
                SyntaxKind::AmpersandAmpersandToken => Some((left != 0 && right != 0) as i64),
                SyntaxKind::BarBarToken => Some((left != 0 || right != 0) as i64),
                _ => None,
            }
        }
        Expression::Identifier(_) | Expression::Assignment(_) | Expression::Call(_) => None,
    }
}

fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}
