//! Local variable declaration compilation.

use contractc_ast::VarDeclStmt;

use super::{Result, StmtCompiler};
use crate::artifacts::ContractParamType;
use crate::ir::SlotKind;
use crate::scope::{Scope, SymbolDef};

impl<'a> StmtCompiler<'a> {
    /// Compile `let`/`const`, allocating a local slot.
    ///
    /// The initializer is lowered before the name is defined, so it sees
    /// any outer variable the declaration shadows. Without an initializer
    /// the slot keeps its initial null.
    pub fn compile_var_decl(&mut self, decl: &VarDeclStmt<'_>, scope: &mut Scope<'_>) -> Result<()> {
        if let Some(init) = decl.init {
            self.expr_compiler(scope).compile(init)?;
        }

        let builder = &mut *self.builder;
        let name = decl.name.name;
        let mut index = 0;
        scope.define(name, decl.name.span, || {
            index = builder.add_local(name, ContractParamType::from_type(&decl.ty));
            SymbolDef::Variable {
                kind: SlotKind::Local,
                index,
                mutable: !decl.is_const,
            }
        })?;

        if decl.init.is_some() {
            self.builder.emit_store(SlotKind::Local, index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinRegistry;
    use crate::context::CompilationContext;
    use crate::ir::{FunctionBuilder, FunctionId, Operation};
    use bumpalo::Bump;
    use contractc_ast::{AstBuilder, Stmt, Type};
    use contractc_core::{CompilationError, LoweringError, SymbolError};

    fn decl<'s, 'ast>(stmt: &'s Stmt<'ast>) -> &'s VarDeclStmt<'ast> {
        match stmt {
            Stmt::VarDecl(decl) => decl,
            other => panic!("expected a declaration, got {}", other.kind_name()),
        }
    }

    #[test]
    fn shadowing_initializer_reads_outer_variable() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let registry = BuiltinRegistry::new();
        let mut outer = Scope::root("f", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");
        let mut compiler = StmtCompiler::new(&mut ctx, &mut builder);

        let first = ast.let_stmt("x", Type::Integer, Some(ast.int(1)));
        compiler.compile_var_decl(decl(&first), &mut outer).unwrap();

        let mut inner = outer.child("block");
        let second = ast.let_stmt("x", Type::Integer, Some(ast.var("x", Type::Integer)));
        compiler.compile_var_decl(decl(&second), &mut inner).unwrap();

        let ops: Vec<_> = builder.ops().iter().map(|op| op.operation.clone()).collect();
        assert_eq!(
            &ops[2..],
            &[
                Operation::LoadSlot(SlotKind::Local, 0),
                Operation::StoreSlot(SlotKind::Local, 1),
            ]
        );
        assert_eq!(builder.local_count(), 2);
    }

    #[test]
    fn duplicate_in_same_scope_allocates_nothing() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let registry = BuiltinRegistry::new();
        let mut scope = Scope::root("f", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");
        let mut compiler = StmtCompiler::new(&mut ctx, &mut builder);

        let first = ast.let_stmt("total", Type::Integer, None);
        compiler.compile_var_decl(decl(&first), &mut scope).unwrap();
        let again = ast.let_stmt("total", Type::Integer, None);
        let err = compiler.compile_var_decl(decl(&again), &mut scope).unwrap_err();

        assert!(matches!(
            err,
            CompilationError::Symbol(SymbolError::DuplicateSymbol { ref name, .. }) if name == "total"
        ));
        assert_eq!(builder.local_count(), 1);
        assert!(builder.is_empty());
    }

    #[test]
    fn const_local_is_read_only() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let registry = BuiltinRegistry::new();
        let mut scope = Scope::root("f", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");
        let mut compiler = StmtCompiler::new(&mut ctx, &mut builder);

        let stmt = ast.const_stmt("limit", Type::Integer, ast.int(3));
        compiler.compile(&stmt, &mut scope).unwrap();
        let assign = ast.expr_stmt(ast.assign(ast.var("limit", Type::Integer), ast.int(4)));
        let err = compiler.compile(&assign, &mut scope).unwrap_err();

        assert!(matches!(
            err,
            CompilationError::Lowering(LoweringError::AssignToConstant { .. })
        ));
    }
}
