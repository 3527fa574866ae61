//! Statement lowering.
//!
//! The [`StmtCompiler`] lowers the statements of one function body into
//! the function's [`FunctionBuilder`], handling:
//! - blocks, each with its own lexical scope
//! - local declarations, which allocate local slots
//! - `if`/`else` and `while` with `break`/`continue`
//! - `return` and `throw`
//! - `try`/`catch`/`finally`
//!
//! Scopes are passed in rather than owned, so a block can open a child
//! scope that borrows the enclosing one for exactly as long as it runs.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = StmtCompiler::new(ctx, &mut builder);
//! compiler.compile(&stmt, &mut scope)?;
//! ```

mod block;
mod if_stmt;
mod return_stmt;
mod try_catch;
mod var_decl;
mod while_stmt;

use contractc_ast::{BreakStmt, ContinueStmt, ExprStmt, Stmt};
use contractc_core::{CompilationError, LoweringError, Span};

use crate::context::CompilationContext;
use crate::expr::ExprCompiler;
use crate::ir::{BreakError, FunctionBuilder};
use crate::scope::Scope;

type Result<T> = std::result::Result<T, CompilationError>;

/// Lowers statements of one function.
pub struct StmtCompiler<'a> {
    ctx: &'a mut CompilationContext,
    builder: &'a mut FunctionBuilder,
}

impl<'a> StmtCompiler<'a> {
    pub fn new(ctx: &'a mut CompilationContext, builder: &'a mut FunctionBuilder) -> Self {
        Self { ctx, builder }
    }

    /// Lower a statement in `scope`.
    pub fn compile(&mut self, stmt: &Stmt<'_>, scope: &mut Scope<'_>) -> Result<()> {
        let start = self.builder.len();

        match stmt {
            Stmt::Block(block) => return self.compile_block(block, scope),
            Stmt::If(if_stmt) => return self.compile_if(if_stmt, scope),
            Stmt::While(while_stmt) => return self.compile_while(while_stmt, scope),
            Stmt::Try(try_stmt) => return self.compile_try(try_stmt, scope),

            Stmt::Expr(expr_stmt) => self.compile_expr_stmt(expr_stmt, scope)?,
            Stmt::VarDecl(var_decl) => self.compile_var_decl(var_decl, scope)?,
            Stmt::Return(ret) => self.compile_return(ret, scope)?,
            Stmt::Throw(throw) => self.compile_throw(throw, scope)?,
            Stmt::Break(brk) => self.compile_break(brk)?,
            Stmt::Continue(cont) => self.compile_continue(cont)?,

            Stmt::Other(raw) => {
                return Err(LoweringError::UnsupportedSyntax {
                    kind: raw.kind.to_string(),
                    span: raw.span,
                }
                .into());
            }
        }

        self.builder.mark_statement(start, stmt.span());
        Ok(())
    }

    /// Evaluate an expression for its side effects.
    fn compile_expr_stmt(&mut self, expr_stmt: &ExprStmt<'_>, scope: &Scope<'_>) -> Result<()> {
        self.expr_compiler(scope).compile_discarded(&expr_stmt.expr)
    }

    fn compile_break(&mut self, brk: &BreakStmt) -> Result<()> {
        let exit = self
            .builder
            .break_exit()
            .map_err(|e| transfer_error(e, "break", brk.span))?;
        self.builder.emit_exit(exit);
        Ok(())
    }

    fn compile_continue(&mut self, cont: &ContinueStmt) -> Result<()> {
        let exit = self
            .builder
            .continue_exit()
            .map_err(|e| transfer_error(e, "continue", cont.span))?;
        self.builder.emit_exit(exit);
        Ok(())
    }

    /// Create an expression compiler over `scope`.
    fn expr_compiler<'s, 'p>(&'s mut self, scope: &'s Scope<'p>) -> ExprCompiler<'s, 'p> {
        ExprCompiler::new(self.ctx, self.builder, scope)
    }
}

/// Map a failed control transfer to a diagnostic.
fn transfer_error(error: BreakError, keyword: &str, span: Span) -> CompilationError {
    match error {
        BreakError::NotInLoop => LoweringError::ControlFlowOutsideLoop {
            keyword: keyword.to_string(),
            span,
        }
        .into(),
        BreakError::AcrossTry => LoweringError::UnsupportedSyntax {
            kind: format!("'{keyword}' leaving a finally block or nested try"),
            span,
        }
        .into(),
    }
}
