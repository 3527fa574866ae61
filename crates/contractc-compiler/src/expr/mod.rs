//! Expression lowering.
//!
//! The [`ExprCompiler`] turns a typed expression into operations that leave
//! its value on the evaluation stack. Types arrive pre-computed on every
//! node; they only steer opcode selection.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = ExprCompiler::new(ctx, builder, &scope);
//! compiler.compile(expr)?;
//! ```

mod assignment;
mod binary;
mod calls;
mod identifiers;
mod literals;
mod member;
mod unary;

use contractc_ast::Expr;
use contractc_core::{CompilationError, LoweringError};

use crate::bytecode::OpCode;
use crate::context::CompilationContext;
use crate::ir::FunctionBuilder;
use crate::scope::Scope;

type Result<T> = std::result::Result<T, CompilationError>;

/// Lowers expressions of one function.
pub struct ExprCompiler<'a, 'p> {
    ctx: &'a mut CompilationContext,
    builder: &'a mut FunctionBuilder,
    scope: &'a Scope<'p>,
}

impl<'a, 'p> ExprCompiler<'a, 'p> {
    pub fn new(
        ctx: &'a mut CompilationContext,
        builder: &'a mut FunctionBuilder,
        scope: &'a Scope<'p>,
    ) -> Self {
        Self {
            ctx,
            builder,
            scope,
        }
    }

    /// Lower an expression, leaving its value on the stack.
    ///
    /// Calls to functions without a return value leave nothing.
    pub fn compile(&mut self, expr: &Expr<'_>) -> Result<()> {
        match expr {
            Expr::Literal(lit) => literals::compile_literal(self, lit),
            Expr::Ident(ident) => identifiers::compile_ident(self, ident),
            Expr::Binary(bin) => binary::compile_binary(self, bin),
            Expr::Unary(un) => unary::compile_unary(self, un),
            Expr::Assign(assign) => assignment::compile_assign(self, assign, true),
            Expr::Call(call) => calls::compile_call(self, call).map(|_| ()),
            Expr::Member(member) => member::compile_member(self, member),
            Expr::Paren(paren) => self.compile(paren.expr),
            Expr::Other(raw) => Err(LoweringError::UnsupportedSyntax {
                kind: raw.kind.to_string(),
                span: raw.span,
            }
            .into()),
        }
    }

    /// Lower an expression evaluated only for its side effects.
    ///
    /// Nothing is left on the stack: assignments skip the `DUP`, and any
    /// produced value is dropped.
    pub fn compile_discarded(&mut self, expr: &Expr<'_>) -> Result<()> {
        let expr = expr.unparenthesized();
        let leaves_value = match expr {
            Expr::Assign(assign) => {
                assignment::compile_assign(self, assign, false)?;
                false
            }
            Expr::Call(call) => calls::compile_call(self, call)?,
            other => {
                self.compile(other)?;
                !other.ty().is_void()
            }
        };
        if leaves_value {
            self.builder.emit_op(OpCode::Drop);
        }
        Ok(())
    }

    /// Name of the function being lowered, for diagnostics.
    fn function_name(&self) -> &str {
        self.builder.name()
    }
}
