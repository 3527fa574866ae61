//! Declarations Pass - build the global scope.
//!
//! Scans the top-level items once and defines:
//! - one [`SymbolDef::Function`] per function with a body, ids in
//!   declaration order
//! - one [`SymbolDef::Constant`] per `const`, whose initializer must be a
//!   literal (or a minus applied directly to a numeric literal)
//! - one static [`SymbolDef::Variable`] per file-level `let`, slots in
//!   declaration order
//!
//! When statics exist, the synthesized `_initialize` function takes the id
//! after the last declared function.

use contractc_ast::{
    ConstDecl, Expr, FunctionDecl, Item, LiteralKind, Program, StaticDecl, UnaryOp,
};
use contractc_core::{CompilationError, LoweringError, Span, SymbolError};
use tracing::debug;

use crate::artifacts::ContractParamType;
use crate::builtins::BuiltinRegistry;
use crate::context::CompilationContext;
use crate::ir::{FunctionId, SlotInfo, SlotKind};
use crate::scope::{ConstantValue, Scope, SymbolDef};

/// Name of the synthesized static initializer.
pub const INITIALIZE: &str = "_initialize";

/// Output of the declarations pass.
#[derive(Debug)]
pub struct Declarations<'r, 'ast> {
    /// The global scope, parent of every function scope.
    pub scope: Scope<'r>,
    /// Functions with a body, indexed by [`FunctionId`].
    pub functions: Vec<&'ast FunctionDecl<'ast>>,
    /// File-level variables, indexed by static slot.
    pub statics: Vec<&'ast StaticDecl<'ast>>,
    /// Id of `_initialize`, present iff there are statics.
    pub initializer: Option<FunctionId>,
}

impl Declarations<'_, '_> {
    /// Debug descriptors of the static slots.
    pub fn static_slots(&self) -> Vec<SlotInfo> {
        self.statics
            .iter()
            .map(|decl| SlotInfo {
                name: decl.name.name.to_string(),
                ty: ContractParamType::from_type(&decl.ty),
            })
            .collect()
    }
}

/// Pass 1: define every top-level name.
pub struct DeclarationPass<'a, 'r> {
    ctx: &'a mut CompilationContext,
    registry: &'r BuiltinRegistry,
}

impl<'a, 'r> DeclarationPass<'a, 'r> {
    pub fn new(ctx: &'a mut CompilationContext, registry: &'r BuiltinRegistry) -> Self {
        Self { ctx, registry }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run<'ast>(self, program: &Program<'ast>) -> Declarations<'r, 'ast> {
        let mut scope = Scope::root("global", self.registry);
        let mut functions: Vec<&'ast FunctionDecl<'ast>> = Vec::new();
        let mut statics: Vec<&'ast StaticDecl<'ast>> = Vec::new();

        for item in program.items() {
            let result = match item {
                Item::Function(decl) if decl.body.is_some() => {
                    let id = FunctionId(functions.len() as u32);
                    functions.push(*decl);
                    define(&mut scope, decl.name.name, decl.name.span, || SymbolDef::Function {
                        id,
                        param_count: decl.params.len() as u32,
                        returns_value: !decl.return_type.is_void(),
                    })
                }
                Item::Const(decl) => constant_value(decl).and_then(|value| {
                    define(&mut scope, decl.name.name, decl.name.span, || {
                        SymbolDef::Constant(value)
                    })
                }),
                Item::Static(decl) => {
                    let index = statics.len() as u32;
                    statics.push(*decl);
                    define(&mut scope, decl.name.name, decl.name.span, || SymbolDef::Variable {
                        kind: SlotKind::Static,
                        index,
                        mutable: true,
                    })
                }
                // Bound by the builtins pass.
                Item::Function(_) | Item::Interface(_) | Item::Declare(_) => Ok(()),
                Item::Other(raw) => Err(LoweringError::UnsupportedSyntax {
                    kind: raw.kind.to_string(),
                    span: raw.span,
                }
                .into()),
            };
            if let Err(e) = result {
                self.ctx.add_error(e);
            }
        }

        let initializer = if statics.is_empty() {
            None
        } else {
            let id = FunctionId(functions.len() as u32);
            let span = statics.first().map(|decl| decl.span).unwrap_or_default();
            let defined = define(&mut scope, INITIALIZE, span, || SymbolDef::Function {
                id,
                param_count: 0,
                returns_value: false,
            });
            if let Err(e) = defined {
                self.ctx.add_error(e);
            }
            Some(id)
        };

        debug!(
            functions = functions.len(),
            statics = statics.len(),
            symbols = scope.len(),
            "global scope built"
        );
        Declarations {
            scope,
            functions,
            statics,
            initializer,
        }
    }
}

fn define(
    scope: &mut Scope<'_>,
    name: &str,
    span: Span,
    factory: impl FnOnce() -> SymbolDef,
) -> Result<(), CompilationError> {
    scope.define(name, span, factory)?;
    Ok(())
}

/// The literal value of a top-level constant. Nothing is folded.
fn constant_value(decl: &ConstDecl<'_>) -> Result<ConstantValue, CompilationError> {
    let value = match decl.value {
        Expr::Literal(lit) => match &lit.kind {
            LiteralKind::Int(value) => Some(ConstantValue::Int(value.clone())),
            LiteralKind::Bool(value) => Some(ConstantValue::Bool(*value)),
            LiteralKind::String(text) => Some(ConstantValue::Bytes(text.as_bytes().to_vec())),
            LiteralKind::Bytes(bytes) => Some(ConstantValue::Bytes(bytes.to_vec())),
            LiteralKind::Null => Some(ConstantValue::Null),
        },
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => match unary.operand {
            Expr::Literal(lit) => match &lit.kind {
                LiteralKind::Int(value) => Some(ConstantValue::Int(-value)),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    };

    value.ok_or_else(|| {
        SymbolError::InvalidConstant {
            name: decl.name.name.to_string(),
            span: decl.value.span(),
        }
        .into()
    })
}
