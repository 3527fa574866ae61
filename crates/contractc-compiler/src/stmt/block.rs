//! Block statement compilation.

use contractc_ast::Block;

use super::{Result, StmtCompiler};
use crate::scope::Scope;

impl<'a> StmtCompiler<'a> {
    /// Compile a block in a fresh child scope.
    ///
    /// Zero-size anchors mark the opening and closing braces so a debugger
    /// can stop on both.
    pub fn compile_block(&mut self, block: &Block<'_>, scope: &mut Scope<'_>) -> Result<()> {
        self.builder.emit_anchor(block.span.start());

        let mut inner = scope.child("block");
        for stmt in block.stmts {
            self.compile(stmt, &mut inner)?;
        }

        self.builder.emit_anchor(block.span.end());
        Ok(())
    }
}
