//! Binary operator compilation.
//!
//! Opcode selection depends on the operand type:
//! - integers use the arithmetic, shift, bitwise and numeric comparison opcodes
//! - strings and byte strings concatenate with `CAT` and compare with `EQUAL`
//! - any other type only supports `==` and `!=`
//!
//! `&&`, `||` and `??` short-circuit and never evaluate the right operand
//! when the left one decides the result.

use contractc_ast::{BinaryExpr, BinaryOp, Expr, LiteralKind, Type};
use contractc_core::{LoweringError, Span};

use super::{ExprCompiler, Result};
use crate::bytecode::{OpCode, StackItemType};
use crate::ir::{JumpKind, Operation};

pub fn compile_binary(compiler: &mut ExprCompiler<'_, '_>, bin: &BinaryExpr<'_>) -> Result<()> {
    if bin.op.is_short_circuit() {
        return compile_short_circuit(compiler, bin);
    }

    if matches!(bin.op, BinaryOp::Equal | BinaryOp::NotEqual) {
        if let Some(other) = null_comparison_operand(bin) {
            compiler.compile(other)?;
            compiler.builder.emit_op(OpCode::IsNull);
            if bin.op == BinaryOp::NotEqual {
                compiler.builder.emit_op(OpCode::Not);
            }
            return Ok(());
        }
    }

    compiler.compile(bin.left)?;
    compiler.compile(bin.right)?;
    emit_operator(compiler, bin.op, operand_type(bin), bin.span)
}

/// Type the operator applies to: the left operand's, unless that is `null`.
fn operand_type<'ast>(bin: &BinaryExpr<'ast>) -> Type<'ast> {
    match bin.left.ty() {
        Type::Null => bin.right.ty(),
        ty => ty,
    }
}

/// The non-null side of a comparison against a `null` literal.
fn null_comparison_operand<'e, 'ast>(bin: &'e BinaryExpr<'ast>) -> Option<&'e Expr<'ast>> {
    let is_null = |e: &Expr<'_>| {
        matches!(e.unparenthesized(), Expr::Literal(lit) if lit.kind == LiteralKind::Null)
    };
    if is_null(bin.right) {
        Some(bin.left)
    } else if is_null(bin.left) {
        Some(bin.right)
    } else {
        None
    }
}

/// Emit the opcode(s) for `op` with both operands already on the stack.
pub(super) fn emit_operator(
    compiler: &mut ExprCompiler<'_, '_>,
    op: BinaryOp,
    ty: Type<'_>,
    span: Span,
) -> Result<()> {
    let unsupported = || LoweringError::UnsupportedOperator {
        op: op.as_str().to_string(),
        ty: ty.to_string(),
        span,
    };

    if ty.is_integer() {
        let opcode = integer_opcode(op).ok_or_else(unsupported)?;
        compiler.builder.emit_op(opcode);
        return Ok(());
    }

    match op {
        BinaryOp::Add if ty.is_byte_like() => {
            // CAT yields a Buffer; keep string semantics for later comparisons
            compiler.builder.emit_op(OpCode::Cat);
            compiler
                .builder
                .emit(Operation::Convert(StackItemType::ByteString));
        }
        BinaryOp::Equal => {
            compiler.builder.emit_op(OpCode::Equal);
        }
        BinaryOp::NotEqual => {
            compiler.builder.emit_op(OpCode::NotEqual);
        }
        _ => return Err(unsupported().into()),
    }
    Ok(())
}

fn integer_opcode(op: BinaryOp) -> Option<OpCode> {
    let opcode = match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::Mod => OpCode::Mod,
        BinaryOp::Pow => OpCode::Pow,
        BinaryOp::ShiftLeft => OpCode::Shl,
        BinaryOp::ShiftRight => OpCode::Shr,
        BinaryOp::BitwiseAnd => OpCode::And,
        BinaryOp::BitwiseOr => OpCode::Or,
        BinaryOp::BitwiseXor => OpCode::Xor,
        BinaryOp::Less => OpCode::Lt,
        BinaryOp::LessEqual => OpCode::Le,
        BinaryOp::Greater => OpCode::Gt,
        BinaryOp::GreaterEqual => OpCode::Ge,
        BinaryOp::Equal => OpCode::NumEqual,
        BinaryOp::NotEqual => OpCode::NumNotEqual,
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalesce => return None,
    };
    Some(opcode)
}

/// Compile `&&`, `||` or `??`.
///
/// ```text
/// [left]
/// DUP
/// (ISNULL)                      ; ?? only
/// JMPIFNOT_L end / JMPIF_L end  ; keep left when it decides
/// DROP
/// [right]
/// end:
/// ```
fn compile_short_circuit(compiler: &mut ExprCompiler<'_, '_>, bin: &BinaryExpr<'_>) -> Result<()> {
    compiler.compile(bin.left)?;

    let end = compiler.builder.new_label();
    compiler.builder.emit_op(OpCode::Dup);
    let kind = match bin.op {
        BinaryOp::LogicalAnd => JumpKind::IfFalse,
        BinaryOp::LogicalOr => JumpKind::IfTrue,
        _ => {
            compiler.builder.emit_op(OpCode::IsNull);
            JumpKind::IfFalse
        }
    };
    compiler.builder.emit_jump(kind, end);
    compiler.builder.emit_op(OpCode::Drop);

    compiler.compile(bin.right)?;
    compiler.builder.place_label(end);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinRegistry;
    use crate::context::CompilationContext;
    use crate::ir::{FunctionBuilder, FunctionId, Label};
    use crate::scope::Scope;
    use bumpalo::Bump;
    use contractc_ast::AstBuilder;
    use contractc_core::CompilationError;
    use num_bigint::BigInt;

    fn lower(expr: &Expr<'_>) -> Result<Vec<Operation>> {
        let registry = BuiltinRegistry::new();
        let scope = Scope::root("global", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");
        ExprCompiler::new(&mut ctx, &mut builder, &scope).compile(expr)?;
        Ok(builder.ops().iter().map(|op| op.operation.clone()).collect())
    }

    fn int(v: i64) -> Operation {
        Operation::PushInt(BigInt::from(v))
    }

    #[test]
    fn integer_operators() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let cases = [
            (BinaryOp::Add, OpCode::Add),
            (BinaryOp::Pow, OpCode::Pow),
            (BinaryOp::ShiftRight, OpCode::Shr),
            (BinaryOp::BitwiseXor, OpCode::Xor),
            (BinaryOp::LessEqual, OpCode::Le),
            (BinaryOp::Equal, OpCode::NumEqual),
            (BinaryOp::NotEqual, OpCode::NumNotEqual),
        ];
        for (op, opcode) in cases {
            let expr = ast.binary(ast.int(7), op, ast.int(3), Type::Integer);
            assert_eq!(
                lower(&expr).unwrap(),
                vec![int(7), int(3), Operation::Simple(opcode)],
                "{op}"
            );
        }
    }

    #[test]
    fn string_concat_and_equality() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);

        let concat = ast.binary(ast.string("a"), BinaryOp::Add, ast.string("b"), Type::String);
        let ops = lower(&concat).unwrap();
        assert_eq!(
            &ops[2..],
            &[
                Operation::Simple(OpCode::Cat),
                Operation::Convert(StackItemType::ByteString)
            ]
        );

        let eq = ast.binary(ast.string("a"), BinaryOp::Equal, ast.string("b"), Type::Boolean);
        assert_eq!(lower(&eq).unwrap()[2], Operation::Simple(OpCode::Equal));
    }

    #[test]
    fn unsupported_combination() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let expr = ast.binary(ast.string("a"), BinaryOp::Mul, ast.string("b"), Type::String);

        let err = lower(&expr).unwrap_err();
        assert!(matches!(
            err,
            CompilationError::Lowering(LoweringError::UnsupportedOperator { ref op, ref ty, .. })
                if op == "*" && ty == "string"
        ));
    }

    #[test]
    fn null_comparison_uses_isnull() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let expr = ast.binary(
            ast.int(1),
            BinaryOp::NotEqual,
            ast.null(),
            Type::Boolean,
        );
        assert_eq!(
            lower(&expr).unwrap(),
            vec![
                int(1),
                Operation::Simple(OpCode::IsNull),
                Operation::Simple(OpCode::Not),
            ]
        );
    }

    #[test]
    fn logical_and_short_circuits() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let expr = ast.binary(
            ast.boolean(true),
            BinaryOp::LogicalAnd,
            ast.boolean(false),
            Type::Boolean,
        );
        assert_eq!(
            lower(&expr).unwrap(),
            vec![
                Operation::PushBool(true),
                Operation::Simple(OpCode::Dup),
                Operation::Jump(JumpKind::IfFalse, Label(1)),
                Operation::Simple(OpCode::Drop),
                Operation::PushBool(false),
                Operation::Label(Label(1)),
            ]
        );
    }

    #[test]
    fn nullish_coalesce_tests_for_null() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let expr = ast.binary(ast.null(), BinaryOp::NullishCoalesce, ast.int(5), Type::Integer);
        let ops = lower(&expr).unwrap();
        assert_eq!(
            &ops[..4],
            &[
                Operation::PushNull,
                Operation::Simple(OpCode::Dup),
                Operation::Simple(OpCode::IsNull),
                Operation::Jump(JumpKind::IfFalse, Label(1)),
            ]
        );
    }
}
