//! If statement compilation.

use contractc_ast::{Expr, IfStmt};

use super::{Result, StmtCompiler};
use crate::ir::{JumpKind, Label};
use crate::scope::Scope;

impl<'a> StmtCompiler<'a> {
    /// Compile an if statement.
    ///
    /// Layout:
    /// ```text
    /// [condition]
    /// JMPIFNOT_L else
    /// [then]
    /// JMP_L end        ; only with an else branch
    /// else:
    /// [else]
    /// end:
    /// ```
    pub fn compile_if(&mut self, if_stmt: &IfStmt<'_>, scope: &mut Scope<'_>) -> Result<()> {
        let else_label = self.builder.new_label();
        self.compile_condition(if_stmt.condition, else_label, scope)?;

        self.compile(if_stmt.then_branch, scope)?;

        match if_stmt.else_branch {
            Some(else_branch) => {
                let end_label = self.builder.new_label();
                self.builder.emit_jump(JumpKind::Always, end_label);
                self.builder.place_label(else_label);
                self.compile(else_branch, scope)?;
                self.builder.place_label(end_label);
            }
            None => self.builder.place_label(else_label),
        }
        Ok(())
    }

    /// Lower a branch condition and jump to `target` when it is false.
    ///
    /// The condition's first operation carries the condition's location.
    pub(super) fn compile_condition(
        &mut self,
        condition: &Expr<'_>,
        target: Label,
        scope: &Scope<'_>,
    ) -> Result<()> {
        let start = self.builder.len();
        self.expr_compiler(scope).compile(condition)?;
        self.builder.mark_statement(start, condition.span());
        self.builder.emit_jump(JumpKind::IfFalse, target);
        Ok(())
    }
}
