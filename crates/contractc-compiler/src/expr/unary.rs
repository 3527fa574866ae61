//! Unary prefix operator compilation.

use contractc_ast::{Expr, LiteralKind, UnaryExpr, UnaryOp};

use super::{ExprCompiler, Result};
use crate::bytecode::OpCode;
use crate::ir::Operation;

pub fn compile_unary(compiler: &mut ExprCompiler<'_, '_>, un: &UnaryExpr<'_>) -> Result<()> {
    // negative literals are pushed directly
    if un.op == UnaryOp::Neg
        && let Expr::Literal(lit) = un.operand.unparenthesized()
        && let LiteralKind::Int(value) = &lit.kind
    {
        compiler.builder.emit(Operation::PushInt(-value));
        return Ok(());
    }

    compiler.compile(un.operand)?;
    match un.op {
        UnaryOp::LogicalNot => {
            compiler.builder.emit_op(OpCode::Not);
        }
        UnaryOp::Neg => {
            compiler.builder.emit_op(OpCode::Negate);
        }
        UnaryOp::BitwiseNot => {
            compiler.builder.emit_op(OpCode::Invert);
        }
        UnaryOp::Plus => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinRegistry;
    use crate::context::CompilationContext;
    use crate::ir::{FunctionBuilder, FunctionId};
    use crate::scope::Scope;
    use bumpalo::Bump;
    use contractc_ast::{AstBuilder, Type};
    use num_bigint::BigInt;

    fn lower(expr: &Expr<'_>) -> Vec<Operation> {
        let registry = BuiltinRegistry::new();
        let scope = Scope::root("global", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");
        ExprCompiler::new(&mut ctx, &mut builder, &scope)
            .compile(expr)
            .unwrap();
        builder.ops().iter().map(|op| op.operation.clone()).collect()
    }

    #[test]
    fn negative_literal_is_folded() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let expr = ast.unary(UnaryOp::Neg, ast.int(200), Type::Integer);
        assert_eq!(lower(&expr), vec![Operation::PushInt(BigInt::from(-200))]);
    }

    #[test]
    fn operators() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);

        let not = ast.unary(UnaryOp::LogicalNot, ast.boolean(true), Type::Boolean);
        assert_eq!(
            lower(&not),
            vec![Operation::PushBool(true), Operation::Simple(OpCode::Not)]
        );

        let inv = ast.unary(UnaryOp::BitwiseNot, ast.int(0), Type::Integer);
        assert_eq!(lower(&inv)[1], Operation::Simple(OpCode::Invert));

        let neg = ast.unary(
            UnaryOp::Neg,
            ast.binary(ast.int(1), contractc_ast::BinaryOp::Add, ast.int(2), Type::Integer),
            Type::Integer,
        );
        assert_eq!(lower(&neg).last(), Some(&Operation::Simple(OpCode::Negate)));

        let plus = ast.unary(UnaryOp::Plus, ast.int(3), Type::Integer);
        assert_eq!(lower(&plus), vec![Operation::PushInt(BigInt::from(3))]);
    }
}
