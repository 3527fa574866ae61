//! Literal expression compilation.
//!
//! Integers are emitted as [`Operation::PushInt`]; the encoder later picks
//! the compact or fixed-width form. Strings are pushed as their UTF-8 bytes.

use contractc_ast::{LiteralExpr, LiteralKind};

use super::{ExprCompiler, Result};
use crate::ir::Operation;

pub fn compile_literal(compiler: &mut ExprCompiler<'_, '_>, lit: &LiteralExpr<'_>) -> Result<()> {
    let op = match &lit.kind {
        LiteralKind::Int(value) => Operation::PushInt(value.clone()),
        LiteralKind::Bool(value) => Operation::PushBool(*value),
        LiteralKind::String(text) => Operation::PushData(text.as_bytes().to_vec()),
        LiteralKind::Bytes(bytes) => Operation::PushData(bytes.to_vec()),
        LiteralKind::Null => Operation::PushNull,
    };
    compiler.builder.emit(op);
    Ok(())
}
