//! Try statement compilation.
//!
//! ## Bytecode Layout
//!
//! ```text
//! TRY_L catch, finally   ; 0 for an absent handler
//! [try body]
//! ENDTRY_L end
//! catch:
//! STLOC e | DROP         ; bind or discard the exception
//! [catch body]
//! ENDTRY_L end
//! finally:
//! [finally body]
//! ENDFINALLY
//! end:
//! ```
//!
//! `ENDTRY` runs the finally block, if any, before continuing at `end`, so
//! both the body and the handler leave through it. The machine resumes
//! after `ENDFINALLY` at the address the preceding `ENDTRY` named.

use contractc_ast::TryStmt;

use super::{Result, StmtCompiler};
use crate::artifacts::ContractParamType;
use crate::bytecode::OpCode;
use crate::ir::{Label, Operation, SlotKind, TryPhase};
use crate::scope::{Scope, SymbolDef};

impl<'a> StmtCompiler<'a> {
    /// Compile a try statement.
    pub fn compile_try(&mut self, try_stmt: &TryStmt<'_>, scope: &mut Scope<'_>) -> Result<()> {
        let catch_label = try_stmt.catch.map(|_| self.builder.new_label());
        let finally_label = try_stmt.finally.map(|_| self.builder.new_label());
        let end_label = self.builder.new_label();

        let handle = self.builder.emit(Operation::Try {
            catch: catch_label,
            finally: finally_label,
        });
        self.builder.set_location(handle, try_stmt.span);

        self.builder.enter_try();
        let result = self.compile_try_regions(try_stmt, catch_label, finally_label, end_label, scope);
        self.builder.exit_try();
        result?;

        self.builder.place_label(end_label);
        Ok(())
    }

    fn compile_try_regions(
        &mut self,
        try_stmt: &TryStmt<'_>,
        catch_label: Option<Label>,
        finally_label: Option<Label>,
        end_label: Label,
        scope: &mut Scope<'_>,
    ) -> Result<()> {
        self.compile_block(&try_stmt.body, scope)?;
        self.builder.emit(Operation::EndTry(end_label));

        if let (Some(clause), Some(label)) = (&try_stmt.catch, catch_label) {
            self.builder.place_label(label);
            self.builder.set_try_phase(TryPhase::Catch);

            let mut handler = scope.child("catch");
            match clause.param {
                Some(param) => {
                    let builder = &mut *self.builder;
                    let mut index = 0;
                    handler.define(param.name, param.span, || {
                        index = builder.add_local(param.name, ContractParamType::Any);
                        SymbolDef::Variable {
                            kind: SlotKind::Local,
                            index,
                            mutable: true,
                        }
                    })?;
                    self.builder.emit_store(SlotKind::Local, index);
                }
                None => {
                    self.builder.emit_op(OpCode::Drop);
                }
            }

            self.compile_block(&clause.body, &mut handler)?;
            self.builder.emit(Operation::EndTry(end_label));
        }

        if let (Some(block), Some(label)) = (&try_stmt.finally, finally_label) {
            self.builder.place_label(label);
            self.builder.set_try_phase(TryPhase::Finally);
            self.compile_block(block, scope)?;
            self.builder.emit_op(OpCode::EndFinally);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinRegistry;
    use crate::context::CompilationContext;
    use crate::ir::{FunctionBuilder, FunctionId, JumpKind};
    use bumpalo::Bump;
    use contractc_ast::{AstBuilder, Stmt, Type};
    use contractc_core::{CompilationError, LoweringError};
    use num_bigint::BigInt;

    fn lower(stmt: &Stmt<'_>) -> Result<(Vec<Operation>, usize)> {
        let registry = BuiltinRegistry::new();
        let mut scope = Scope::root("f", &registry);
        let mut ctx = CompilationContext::new();
        let mut builder = FunctionBuilder::new(FunctionId(0), "test");
        StmtCompiler::new(&mut ctx, &mut builder).compile(stmt, &mut scope)?;
        let ops = builder
            .ops()
            .iter()
            .map(|op| op.operation.clone())
            .filter(|op| *op != Operation::Anchor)
            .collect();
        Ok((ops, builder.local_count()))
    }

    #[test]
    fn try_catch_finally_layout() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let stmt = ast.try_stmt(
            vec![ast.throw_stmt(ast.int(1))],
            Some((Some("e"), vec![ast.expr_stmt(ast.var("e", Type::Any))])),
            Some(vec![]),
        );

        let (ops, locals) = lower(&stmt).unwrap();
        let (catch, finally, end) = (Label(1), Label(2), Label(3));
        assert_eq!(
            ops,
            vec![
                Operation::Try {
                    catch: Some(catch),
                    finally: Some(finally),
                },
                Operation::PushInt(BigInt::from(1)),
                Operation::Simple(OpCode::Throw),
                Operation::EndTry(end),
                Operation::Label(catch),
                Operation::StoreSlot(SlotKind::Local, 0),
                Operation::LoadSlot(SlotKind::Local, 0),
                Operation::Simple(OpCode::Drop),
                Operation::EndTry(end),
                Operation::Label(finally),
                Operation::Simple(OpCode::EndFinally),
                Operation::Label(end),
            ]
        );
        assert_eq!(locals, 1);
    }

    #[test]
    fn catch_without_binding_drops_exception() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let stmt = ast.try_stmt(vec![], Some((None, vec![])), None);

        let (ops, locals) = lower(&stmt).unwrap();
        assert_eq!(
            ops[0],
            Operation::Try {
                catch: Some(Label(1)),
                finally: None,
            }
        );
        assert!(ops.contains(&Operation::Simple(OpCode::Drop)));
        assert_eq!(locals, 0);
    }

    #[test]
    fn return_inside_try_uses_endtry() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let stmt = ast.try_stmt(
            vec![ast.return_stmt(Some(ast.int(3)))],
            None,
            Some(vec![]),
        );

        let (ops, _) = lower(&stmt).unwrap();
        assert_eq!(ops[2], Operation::EndTry(Label(0)));
        assert!(!ops.contains(&Operation::Jump(JumpKind::Always, Label(0))));
    }

    #[test]
    fn leaving_finally_is_unsupported() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let stmt = ast.while_stmt(
            ast.boolean(true),
            ast.try_stmt(vec![], None, Some(vec![ast.break_stmt()])),
        );

        let err = lower(&stmt).unwrap_err();
        assert!(matches!(
            err,
            CompilationError::Lowering(LoweringError::UnsupportedSyntax { .. })
        ));
    }

    #[test]
    fn break_across_one_try_region() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let stmt = ast.while_stmt(
            ast.boolean(true),
            ast.try_stmt(vec![ast.break_stmt()], Some((None, vec![])), None),
        );

        let (ops, _) = lower(&stmt).unwrap();
        let brk = Label(2);
        assert_eq!(ops.iter().filter(|op| **op == Operation::EndTry(brk)).count(), 1);
    }
}
