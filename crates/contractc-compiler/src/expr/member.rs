//! Property access compilation.
//!
//! Two forms are supported:
//! - members of a declared builtin object (`Runtime.time`), which emit the
//!   member's bound sequence with no argument pushes
//! - `.length` on strings, byte strings and arrays, which lowers to `SIZE`

use contractc_ast::{Expr, MemberExpr};
use contractc_core::{LoweringError, SymbolError};

use super::{ExprCompiler, Result, calls};
use crate::bytecode::OpCode;
use crate::scope::{Scope, Symbol, SymbolDef};

pub fn compile_member(compiler: &mut ExprCompiler<'_, '_>, member: &MemberExpr<'_>) -> Result<()> {
    let scope = compiler.scope;
    if let Some(symbol) = object_member(scope, member)? {
        return match &symbol.def {
            SymbolDef::Builtin(call) if call.is_property => {
                for op in &call.ops {
                    compiler.builder.emit(op.clone());
                }
                Ok(())
            }
            SymbolDef::MethodToken(token) if token.is_property => {
                calls::emit_method_token(compiler, token, member.span)
            }
            other => Err(LoweringError::InvalidSymbolUse {
                name: symbol.name.clone(),
                kind: other.kind_name().to_string(),
                span: member.span,
            }
            .into()),
        };
    }

    if member.member.name == "length" && member.object.ty().has_length() {
        compiler.compile(member.object)?;
        compiler.builder.emit_op(OpCode::Size);
        return Ok(());
    }

    Err(LoweringError::UnsupportedSyntax {
        kind: "PropertyAccessExpression".to_string(),
        span: member.span,
    }
    .into())
}

/// The member symbol when `member.object` names a builtin object.
///
/// `None` if the object is not such a name; an error if it is, but the
/// member does not exist.
pub(super) fn object_member<'s>(
    scope: &'s Scope<'_>,
    member: &MemberExpr<'_>,
) -> Result<Option<&'s Symbol>> {
    let Expr::Ident(object) = member.object.unparenthesized() else {
        return Ok(None);
    };
    let Some(Symbol {
        def: SymbolDef::Object { members },
        ..
    }) = scope.lookup(object.ident.name)
    else {
        return Ok(None);
    };

    members
        .get(member.member.name)
        .map(Some)
        .ok_or_else(|| {
            SymbolError::UnresolvedSymbol {
                name: format!("{}.{}", object.ident.name, member.member.name),
                span: member.member.span,
            }
            .into()
        })
}
