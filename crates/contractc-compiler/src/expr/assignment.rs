//! Assignment compilation.
//!
//! Only plain identifiers naming a mutable slot can be assigned. A compound
//! assignment `x op= v` loads `x`, evaluates `v` and applies `op` before
//! storing back.

use contractc_ast::{AssignExpr, Expr};
use contractc_core::LoweringError;

use super::{ExprCompiler, Result, binary};
use crate::bytecode::OpCode;
use crate::scope::SymbolDef;

/// Compile an assignment; `keep` leaves the assigned value on the stack.
pub fn compile_assign(
    compiler: &mut ExprCompiler<'_, '_>,
    assign: &AssignExpr<'_>,
    keep: bool,
) -> Result<()> {
    let target = assign.target.unparenthesized();
    let Expr::Ident(ident) = target else {
        return Err(LoweringError::UnsupportedSyntax {
            kind: format!("assignment to {}", target.kind_name()),
            span: target.span(),
        }
        .into());
    };

    let scope = compiler.scope;
    let symbol = scope.resolve(ident.ident.name, ident.span)?;
    let (kind, index) = match symbol.def {
        SymbolDef::Variable {
            kind,
            index,
            mutable: true,
        } => (kind, index),
        SymbolDef::Variable { mutable: false, .. }
        | SymbolDef::Constant(_)
        | SymbolDef::Function { .. } => {
            return Err(LoweringError::AssignToConstant {
                name: symbol.name.clone(),
                span: assign.span,
            }
            .into());
        }
        ref other => {
            return Err(LoweringError::InvalidSymbolUse {
                name: symbol.name.clone(),
                kind: other.kind_name().to_string(),
                span: ident.span,
            }
            .into());
        }
    };

    match assign.op {
        Some(op) if op.is_short_circuit() => {
            return Err(LoweringError::UnsupportedOperator {
                op: format!("{}=", op.as_str()),
                ty: target.ty().to_string(),
                span: assign.span,
            }
            .into());
        }
        Some(op) => {
            compiler.builder.emit_load(kind, index);
            compiler.compile(assign.value)?;
            binary::emit_operator(compiler, op, target.ty(), assign.span)?;
        }
        None => compiler.compile(assign.value)?,
    }

    if keep {
        compiler.builder.emit_op(OpCode::Dup);
    }
    compiler.builder.emit_store(kind, index);
    Ok(())
}
