//! While loop compilation.
//!
//! Handles while loops with a loop context for break/continue statements.

use contractc_ast::WhileStmt;

use super::{Result, StmtCompiler};
use crate::ir::JumpKind;
use crate::scope::Scope;

impl<'a> StmtCompiler<'a> {
    /// Compile a while loop.
    ///
    /// Layout:
    /// ```text
    /// continue:
    /// [condition]
    /// JMPIFNOT_L break
    /// [body]
    /// JMP_L continue
    /// break:
    /// ```
    pub fn compile_while(&mut self, while_stmt: &WhileStmt<'_>, scope: &mut Scope<'_>) -> Result<()> {
        let continue_label = self.builder.new_label();
        let break_label = self.builder.new_label();

        self.builder.place_label(continue_label);
        self.compile_condition(while_stmt.condition, break_label, scope)?;

        self.builder.enter_loop(continue_label, break_label);
        let body = self.compile(while_stmt.body, scope);
        self.builder.exit_loop();
        body?;

        self.builder.emit_jump(JumpKind::Always, continue_label);
        self.builder.place_label(break_label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinRegistry;
    use crate::context::CompilationContext;
    use crate::ir::{FunctionBuilder, FunctionId, Label, Operation};
    use bumpalo::Bump;
    use contractc_ast::{AstBuilder, Type};

    #[test]
    fn break_and_continue_target_loop_labels() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let registry = BuiltinRegistry::new();
        let mut scope = Scope::root("f", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");

        let stmt = ast.while_stmt(
            ast.boolean(true),
            ast.block(vec![
                ast.if_stmt(ast.boolean(false), ast.continue_stmt(), None),
                ast.break_stmt(),
            ]),
        );
        StmtCompiler::new(&mut ctx, &mut builder)
            .compile(&stmt, &mut scope)
            .unwrap();

        let ops: Vec<_> = builder
            .ops()
            .iter()
            .map(|op| op.operation.clone())
            .filter(|op| *op != Operation::Anchor)
            .collect();
        let (cont, brk, skip) = (Label(1), Label(2), Label(3));
        assert_eq!(
            ops,
            vec![
                Operation::Label(cont),
                Operation::PushBool(true),
                Operation::Jump(JumpKind::IfFalse, brk),
                Operation::PushBool(false),
                Operation::Jump(JumpKind::IfFalse, skip),
                Operation::Jump(JumpKind::Always, cont),
                Operation::Label(skip),
                Operation::Jump(JumpKind::Always, brk),
                Operation::Jump(JumpKind::Always, cont),
                Operation::Label(brk),
            ]
        );
    }

    #[test]
    fn loop_context_is_closed_after_error() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let registry = BuiltinRegistry::new();
        let mut scope = Scope::root("f", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");
        let mut compiler = StmtCompiler::new(&mut ctx, &mut builder);

        let failing = ast.while_stmt(
            ast.boolean(true),
            ast.expr_stmt(ast.var("missing", Type::Integer)),
        );
        assert!(compiler.compile(&failing, &mut scope).is_err());
        assert!(compiler.compile(&ast.break_stmt(), &mut scope).is_err());
    }
}
