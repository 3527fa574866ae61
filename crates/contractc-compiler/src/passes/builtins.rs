//! Builtins Pass - bind annotated declarations to host calls.
//!
//! Walks every declaration without a body and turns its marker into a
//! symbol of the [`BuiltinRegistry`]:
//!
//! - body-less functions carrying `@syscall`, `@operation`, `@methodToken`
//!   or `@event`
//! - interfaces carrying `@nativeContract`, or whose members carry markers
//! - `declare const X: Iface` bindings of a bound interface, which become
//!   global objects
//!
//! Interfaces without any marker are plain types and are skipped. Every
//! declaration is processed even after an error so that all binding
//! problems are reported together.

use contractc_ast::{
    Annotation, DeclareDecl, FunctionDecl, InterfaceDecl, InterfaceMember, Item, MemberKind,
    Param, Program,
};
use contractc_core::{BindingError, CompilationError, Hash160, Span, SymbolError};
use indexmap::IndexMap;
use tracing::debug;

use crate::artifacts::ContractParamType;
use crate::builtins::{BuiltinRegistry, EventInfo, Marker, parse_markers};
use crate::bytecode::CallFlags;
use crate::context::CompilationContext;
use crate::ir::{Operation, SlotInfo};
use crate::scope::{BuiltinCall, MethodTokenRef, ScopeId, Symbol, SymbolDef};

/// Signature of a declaration being bound.
struct Signature<'s, 'ast> {
    name: &'s str,
    params: &'s [Param<'ast>],
    returns_value: bool,
    is_property: bool,
    span: Span,
}

/// Pass 0: build the builtin registry.
pub struct BuiltinsPass<'a> {
    ctx: &'a mut CompilationContext,
    registry: BuiltinRegistry,
}

impl<'a> BuiltinsPass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self {
            ctx,
            registry: BuiltinRegistry::new(),
        }
    }

    /// Bind every marker-carrying declaration of `program`.
    ///
    /// Interfaces are bound before `declare` bindings, so a binding may
    /// precede the interface it names.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> BuiltinRegistry {
        let mut declares = Vec::new();
        for item in program.items() {
            match item {
                Item::Function(decl) if decl.body.is_none() => self.visit_function(decl),
                Item::Function(decl) => self.check_body_markers(decl),
                Item::Interface(decl) => self.visit_interface(decl),
                Item::Declare(decl) => declares.push(*decl),
                _ => {}
            }
        }
        for decl in declares {
            self.visit_declare(decl);
        }

        debug!(
            symbols = self.registry.len(),
            events = self.registry.events().len(),
            "builtins bound"
        );
        self.registry
    }

    fn report(&mut self, error: impl Into<CompilationError>) {
        self.ctx.add_error(error);
    }

    fn define(&mut self, name: &str, span: Span, def: SymbolDef) {
        let symbol = Symbol {
            name: name.to_string(),
            scope: ScopeId::BUILTINS,
            span,
            def,
        };
        if let Err(e) = self.registry.define(symbol) {
            self.report(e);
        }
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    fn visit_function(&mut self, decl: &FunctionDecl<'_>) {
        let markers = match parse_markers(decl.annotations) {
            Ok(markers) => markers,
            Err(e) => return self.report(e),
        };
        let signature = Signature {
            name: decl.name.name,
            params: decl.params,
            returns_value: !decl.return_type.is_void(),
            is_property: false,
            span: decl.span,
        };

        match bind(&markers, &signature, None) {
            Ok(Some(def)) => {
                if let SymbolDef::Event { name, .. } = &def {
                    self.registry.add_event(EventInfo {
                        name: name.clone(),
                        params: slots(decl.params),
                    });
                }
                self.define(decl.name.name, decl.name.span, def);
            }
            Ok(None) => self.report(BindingError::UnsupportedBuiltin {
                name: decl.name.name.to_string(),
                reason: "declaration without a body needs a builtin marker".to_string(),
                span: decl.span,
            }),
            Err(e) => self.report(e),
        }
    }

    /// A function with a body may only carry `@safe`.
    fn check_body_markers(&mut self, decl: &FunctionDecl<'_>) {
        match parse_markers(decl.annotations) {
            Ok(markers) => {
                if let Some(marker) = markers.iter().find(|m| !matches!(m, Marker::Safe)) {
                    let span = marker_span(decl.annotations, marker.tag()).unwrap_or(decl.span);
                    self.report(BindingError::UnsupportedBuiltin {
                        name: format!("@{}", marker.tag()),
                        reason: format!("'{}' has a body", decl.name.name),
                        span,
                    });
                }
            }
            Err(e) => self.report(e),
        }
    }

    // ==========================================================================
    // Interfaces
    // ==========================================================================

    fn visit_interface(&mut self, decl: &InterfaceDecl<'_>) {
        let markers = match parse_markers(decl.annotations) {
            Ok(markers) => markers,
            Err(e) => return self.report(e),
        };

        let mut contract = None;
        for marker in &markers {
            match marker {
                Marker::NativeContract(hash) => contract = Some(*hash),
                other => self.report(BindingError::UnsupportedBuiltin {
                    name: format!("@{}", other.tag()),
                    reason: format!("not applicable to interface '{}'", decl.name.name),
                    span: decl.span,
                }),
            }
        }

        let bound = contract.is_some()
            || decl
                .members
                .iter()
                .any(|member| !member.annotations.is_empty());
        if !bound {
            return;
        }

        let mut members = IndexMap::new();
        for member in decl.members {
            let Some(def) = self.bind_member(member, contract) else {
                continue;
            };
            if members.contains_key(member.name.name) {
                self.report(SymbolError::DuplicateSymbol {
                    name: format!("{}.{}", decl.name.name, member.name.name),
                    span: member.span,
                });
                continue;
            }
            members.insert(
                member.name.name.to_string(),
                Symbol {
                    name: member.name.name.to_string(),
                    scope: ScopeId::BUILTINS,
                    span: member.span,
                    def,
                },
            );
        }

        debug!(interface = decl.name.name, members = members.len(), "interface bound");
        self.registry.register_interface(decl.name.name, members);
    }

    fn bind_member(
        &mut self,
        member: &InterfaceMember<'_>,
        contract: Option<Hash160>,
    ) -> Option<SymbolDef> {
        let markers = match parse_markers(member.annotations) {
            Ok(markers) => markers,
            Err(e) => {
                self.report(e);
                return None;
            }
        };
        let is_property = member.kind == MemberKind::Property;
        let signature = Signature {
            name: member.name.name,
            params: member.params,
            returns_value: is_property || !member.ty.is_void(),
            is_property,
            span: member.span,
        };

        match bind(&markers, &signature, contract) {
            Ok(Some(SymbolDef::Event { .. })) => {
                self.report(BindingError::UnsupportedBuiltin {
                    name: "@event".to_string(),
                    reason: format!("interface member '{}' cannot be an event", member.name.name),
                    span: member.span,
                });
                None
            }
            Ok(Some(def)) => Some(def),
            Ok(None) => {
                self.report(BindingError::UnsupportedBuiltin {
                    name: member.name.name.to_string(),
                    reason: "interface member needs a builtin marker".to_string(),
                    span: member.span,
                });
                None
            }
            Err(e) => {
                self.report(e);
                None
            }
        }
    }

    fn visit_declare(&mut self, decl: &DeclareDecl<'_>) {
        let Some(members) = self.registry.interface(decl.interface.name).cloned() else {
            return self.report(SymbolError::UnresolvedSymbol {
                name: decl.interface.name.to_string(),
                span: decl.interface.span,
            });
        };
        self.define(decl.name.name, decl.name.span, SymbolDef::Object { members });
    }
}

/// The symbol a marker list binds to.
///
/// `Ok(None)` when there is no binding marker and no enclosing native
/// contract to fall back to. `@safe` binds nothing.
fn bind(
    markers: &[Marker],
    signature: &Signature<'_, '_>,
    contract: Option<Hash160>,
) -> Result<Option<SymbolDef>, BindingError> {
    let mut binding = markers.iter().filter(|m| !matches!(m, Marker::Safe));
    let marker = binding.next();
    if let Some(extra) = binding.next() {
        return Err(BindingError::UnsupportedBuiltin {
            name: format!("@{}", extra.tag()),
            reason: format!("'{}' already has a builtin marker", signature.name),
            span: signature.span,
        });
    }

    let param_count = signature.params.len() as u32;
    let builtin = |ops: Vec<Operation>| {
        SymbolDef::Builtin(BuiltinCall {
            ops,
            param_count,
            returns_value: signature.returns_value,
            is_property: signature.is_property,
        })
    };

    let def = match (marker, contract) {
        (Some(Marker::Syscall(syscall)), _) => builtin(vec![Operation::SysCall(*syscall)]),
        (Some(Marker::Operation(ops)), _) => builtin(ops.clone()),
        (Some(Marker::MethodToken { hash, method }), _) => {
            let method = method.as_deref().unwrap_or(signature.name);
            method_token(*hash, method, signature)?
        }
        (Some(Marker::Event(name)), _) => SymbolDef::Event {
            name: name.as_deref().unwrap_or(signature.name).to_string(),
            param_count,
        },
        (Some(Marker::NativeContract(_)), _) => {
            return Err(BindingError::UnsupportedBuiltin {
                name: "@nativeContract".to_string(),
                reason: format!("applies to interfaces, not '{}'", signature.name),
                span: signature.span,
            });
        }
        (Some(Marker::Safe), _) | (None, None) => return Ok(None),
        (None, Some(hash)) => method_token(hash, signature.name, signature)?,
    };
    Ok(Some(def))
}

fn method_token(
    hash: Hash160,
    method: &str,
    signature: &Signature<'_, '_>,
) -> Result<SymbolDef, BindingError> {
    let param_count =
        u16::try_from(signature.params.len()).map_err(|_| BindingError::UnsupportedBuiltin {
            name: signature.name.to_string(),
            reason: format!("{} parameters exceed a method token", signature.params.len()),
            span: signature.span,
        })?;
    Ok(SymbolDef::MethodToken(MethodTokenRef {
        hash,
        method: method.to_string(),
        param_count,
        returns_value: signature.returns_value,
        call_flags: CallFlags::ALL,
        is_property: signature.is_property,
    }))
}

fn slots(params: &[Param<'_>]) -> Vec<SlotInfo> {
    params
        .iter()
        .map(|param| SlotInfo {
            name: param.name.name.to_string(),
            ty: ContractParamType::from_type(&param.ty),
        })
        .collect()
}

fn marker_span(annotations: &[Annotation<'_>], tag: &str) -> Option<Span> {
    annotations.iter().find(|a| a.tag == tag).map(|a| a.span)
}
