//! Identifier compilation.

use contractc_ast::IdentExpr;
use contractc_core::LoweringError;

use super::{ExprCompiler, Result};
use crate::scope::SymbolDef;

/// Push the value an identifier names.
///
/// Slots load through `LDARG`/`LDLOC`/`LDSFLD`; constants are pushed inline.
/// Functions, builtins, events and objects have no value of their own.
pub fn compile_ident(compiler: &mut ExprCompiler<'_, '_>, ident: &IdentExpr<'_>) -> Result<()> {
    let scope = compiler.scope;
    let symbol = scope.resolve(ident.ident.name, ident.span)?;

    match &symbol.def {
        SymbolDef::Variable { kind, index, .. } => {
            compiler.builder.emit_load(*kind, *index);
            Ok(())
        }
        SymbolDef::Constant(value) => {
            compiler.builder.emit(value.push_operation());
            Ok(())
        }
        other => Err(LoweringError::InvalidSymbolUse {
            name: symbol.name.clone(),
            kind: other.kind_name().to_string(),
            span: ident.span,
        }
        .into()),
    }
}
