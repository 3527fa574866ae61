//! Return and throw statement compilation.

use contractc_ast::{ReturnStmt, ThrowStmt};

use super::{Result, StmtCompiler, transfer_error};
use crate::bytecode::OpCode;
use crate::scope::Scope;

impl<'a> StmtCompiler<'a> {
    /// Compile a return statement.
    ///
    /// The value is left on the stack and control transfers to the
    /// function's single return target, through `ENDTRY` when inside a try
    /// region.
    pub fn compile_return(&mut self, ret: &ReturnStmt<'_>, scope: &Scope<'_>) -> Result<()> {
        if let Some(value) = ret.value {
            self.expr_compiler(scope).compile(value)?;
        }

        let exit = self
            .builder
            .return_exit()
            .map_err(|e| transfer_error(e, "return", ret.span))?;
        self.builder.emit_exit(exit);
        Ok(())
    }

    pub fn compile_throw(&mut self, throw: &ThrowStmt<'_>, scope: &Scope<'_>) -> Result<()> {
        self.expr_compiler(scope).compile(throw.value)?;
        self.builder.emit_op(OpCode::Throw);
        Ok(())
    }
}
