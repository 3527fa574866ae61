//! Call expression compilation.
//!
//! Arguments are pushed last to first so the first argument ends up on top
//! of the stack, which is the calling convention of the target machine for
//! `CALL`, `CALLT` and `SYSCALL` alike. The callee then decides what follows:
//!
//! | callee | emitted after the arguments |
//! |---|---|
//! | function | `CALL_L` to its entry |
//! | builtin | its bound operation sequence |
//! | method token | `CALLT` with the token's table index |
//! | event | `PUSH n; PACK; PUSHDATA name; SYSCALL System.Runtime.Notify` |

use contractc_ast::{CallExpr, Expr};
use contractc_core::{CompilationError, EncodingError, LoweringError, Span};

use super::{ExprCompiler, Result, member};
use crate::builtins::Syscall;
use crate::bytecode::{MethodToken, OpCode};
use crate::ir::Operation;
use crate::scope::{MethodTokenRef, Symbol, SymbolDef};

/// Compile a call; returns whether it leaves a value on the stack.
pub fn compile_call(compiler: &mut ExprCompiler<'_, '_>, call: &CallExpr<'_>) -> Result<bool> {
    let symbol = resolve_callee(compiler, call)?;

    if matches!(
        symbol.def,
        SymbolDef::Variable { .. } | SymbolDef::Constant(_) | SymbolDef::Object { .. }
    ) {
        return Err(not_callable(symbol, call));
    }
    if let Some(expected) = arity(&symbol.def)
        && expected as usize != call.args.len()
    {
        return Err(LoweringError::ArgumentCount {
            name: symbol.name.clone(),
            expected,
            found: call.args.len(),
            span: call.span,
        }
        .into());
    }

    for arg in call.args.iter().rev() {
        compiler.compile(arg)?;
    }

    match &symbol.def {
        SymbolDef::Function {
            id, returns_value, ..
        } => {
            compiler.builder.emit(Operation::Call(*id));
            Ok(*returns_value)
        }
        SymbolDef::Builtin(builtin) => {
            for op in &builtin.ops {
                compiler.builder.emit(op.clone());
            }
            Ok(builtin.returns_value)
        }
        SymbolDef::MethodToken(token) => {
            emit_method_token(compiler, token, call.span)?;
            Ok(token.returns_value)
        }
        SymbolDef::Event { name, .. } => {
            compiler.builder.emit_push_int(call.args.len());
            compiler.builder.emit_op(OpCode::Pack);
            compiler.builder.emit_push_data(name.as_bytes());
            compiler
                .builder
                .emit(Operation::SysCall(Syscall::RuntimeNotify));
            Ok(false)
        }
        SymbolDef::Variable { .. } | SymbolDef::Constant(_) | SymbolDef::Object { .. } => {
            Err(not_callable(symbol, call))
        }
    }
}

/// Parameter count of a callable symbol.
fn arity(def: &SymbolDef) -> Option<u32> {
    match def {
        SymbolDef::Function { param_count, .. } | SymbolDef::Event { param_count, .. } => {
            Some(*param_count)
        }
        SymbolDef::Builtin(builtin) => Some(builtin.param_count),
        SymbolDef::MethodToken(token) => Some(u32::from(token.param_count)),
        SymbolDef::Variable { .. } | SymbolDef::Constant(_) | SymbolDef::Object { .. } => None,
    }
}

fn not_callable(symbol: &Symbol, call: &CallExpr<'_>) -> CompilationError {
    LoweringError::InvalidSymbolUse {
        name: symbol.name.clone(),
        kind: symbol.def.kind_name().to_string(),
        span: call.callee.span(),
    }
    .into()
}

fn resolve_callee<'s>(
    compiler: &ExprCompiler<'s, '_>,
    call: &CallExpr<'_>,
) -> Result<&'s Symbol> {
    let scope = compiler.scope;
    match call.callee.unparenthesized() {
        Expr::Ident(ident) => Ok(scope.resolve(ident.ident.name, ident.span)?),
        Expr::Member(access) => member::object_member(scope, access)?.ok_or_else(|| {
            LoweringError::UnsupportedSyntax {
                kind: call_kind(call),
                span: call.span,
            }
            .into()
        }),
        _ => Err(LoweringError::UnsupportedSyntax {
            kind: call_kind(call),
            span: call.span,
        }
        .into()),
    }
}

fn call_kind(call: &CallExpr<'_>) -> String {
    format!("CallExpression on {}", call.callee.kind_name())
}

/// Register a method token on first use and emit `CALLT` for it.
pub(super) fn emit_method_token(
    compiler: &mut ExprCompiler<'_, '_>,
    token: &MethodTokenRef,
    span: Span,
) -> Result<()> {
    let index = compiler
        .ctx
        .tokens_mut()
        .add(MethodToken {
            hash: token.hash,
            method: token.method.clone(),
            param_count: token.param_count,
            has_return_value: token.returns_value,
            call_flags: token.call_flags,
        })
        .ok_or_else(|| EncodingError::OperandTooLarge {
            function: compiler.function_name().to_string(),
            what: "method token table".to_string(),
            size: u16::MAX as u64 + 1,
            max: u16::MAX as u64,
            span: Some(span),
        })?;
    compiler.builder.emit(Operation::CallToken(index));
    Ok(())
}
