//! Lowering Pass - compile function bodies into IR.
//!
//! Each function gets a child of the global scope seeded with its
//! parameters, in declaration order, and its own [`FunctionBuilder`]. When
//! statics exist, `_initialize` is synthesized last: it opens the static
//! slots and runs every initializer in declaration order.
//!
//! A failing function is reported and skipped; the remaining functions are
//! still lowered so that every error surfaces in one run.

use contractc_ast::FunctionDecl;
use contractc_core::CompilationError;
use tracing::{debug, trace};

use super::declarations::{Declarations, INITIALIZE};
use crate::artifacts::ContractParamType;
use crate::context::CompilationContext;
use crate::expr::ExprCompiler;
use crate::ir::{FunctionBuilder, FunctionId, FunctionIr, Operation, SlotKind};
use crate::scope::{Scope, SymbolDef};
use crate::stmt::StmtCompiler;

type Result<T> = std::result::Result<T, CompilationError>;

/// Pass 2: lower every function body.
pub struct LoweringPass<'a> {
    ctx: &'a mut CompilationContext,
}

impl<'a> LoweringPass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self { ctx }
    }

    /// Lower all functions, in id order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, decls: &Declarations<'_, '_>) -> Vec<FunctionIr> {
        let mut functions = Vec::with_capacity(decls.functions.len() + 1);

        for (index, decl) in decls.functions.iter().enumerate() {
            let id = FunctionId(index as u32);
            match self.lower_function(id, decl, &decls.scope) {
                Ok(function) => functions.push(function),
                Err(e) => self.ctx.add_error(e),
            }
        }

        if let Some(id) = decls.initializer {
            match self.lower_initializer(id, decls) {
                Ok(function) => functions.push(function),
                Err(e) => self.ctx.add_error(e),
            }
        }

        debug!(
            functions = functions.len(),
            tokens = self.ctx.tokens().len(),
            "functions lowered"
        );
        functions
    }

    fn lower_function(
        &mut self,
        id: FunctionId,
        decl: &FunctionDecl<'_>,
        global: &Scope<'_>,
    ) -> Result<FunctionIr> {
        let mut builder = FunctionBuilder::new(id, decl.name.name);
        let mut scope = global.child(decl.name.name);

        for param in decl.params {
            let ty = ContractParamType::from_type(&param.ty);
            let builder = &mut builder;
            scope.define(param.name.name, param.span, || SymbolDef::Variable {
                kind: SlotKind::Argument,
                index: builder.add_param(param.name.name, ty),
                mutable: true,
            })?;
        }

        if let Some(body) = &decl.body {
            StmtCompiler::new(self.ctx, &mut builder).compile_block(body, &mut scope)?;
        }

        let mut function = builder.finish()?;
        function.return_type = ContractParamType::from_type(&decl.return_type);
        function.is_export = decl.is_export;
        function.is_safe = decl.is_safe || decl.annotations.iter().any(|a| a.tag == "safe");

        trace!(
            function = %function.name,
            ops = function.ops.len(),
            locals = function.locals.len(),
            "function lowered"
        );
        Ok(function)
    }

    /// Synthesize `_initialize`: `INITSSLOT`, then each initializer and its
    /// `STSFLD`.
    fn lower_initializer(
        &mut self,
        id: FunctionId,
        decls: &Declarations<'_, '_>,
    ) -> Result<FunctionIr> {
        let mut builder = FunctionBuilder::new(id, INITIALIZE);
        builder.emit(Operation::InitStaticSlot(decls.statics.len() as u32));

        for (index, decl) in decls.statics.iter().enumerate() {
            let Some(init) = decl.init else {
                continue;
            };
            let start = builder.len();
            let compiled = ExprCompiler::new(self.ctx, &mut builder, &decls.scope).compile(init);
            if let Err(e) = compiled {
                self.ctx.add_error(e);
                continue;
            }
            builder.emit_store(SlotKind::Static, index as u32);
            builder.mark_statement(start, decl.span);
        }

        let mut function = builder.finish()?;
        function.return_type = ContractParamType::Void;
        function.is_export = true;
        trace!(statics = decls.statics.len(), "static initializer lowered");
        Ok(function)
    }
}
