//! Host-provided builtins.
//!
//! - [`Syscall`] - interop services and their 32-bit ids
//! - [`NativeContract`] - contracts with fixed hashes
//! - [`annotation`] - parsing of the marker tags that bind declarations
//! - [`BuiltinRegistry`] - the symbols produced by binding, consulted by the
//!   root scope when a name is not defined by the program

pub mod annotation;
mod native;
mod syscall;

pub use annotation::{Marker, parse_marker, parse_markers};
pub use native::NativeContract;
pub use syscall::Syscall;

use contractc_core::SymbolError;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::ir::SlotInfo;
use crate::scope::Symbol;

/// An event declared through `@event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    /// Name carried in the notification.
    pub name: String,
    pub params: Vec<SlotInfo>,
}

/// Symbols bound to host calls.
#[derive(Debug, Default)]
pub struct BuiltinRegistry {
    symbols: IndexMap<String, Symbol>,
    /// Members of every interface carrying markers.
    interfaces: FxHashMap<String, IndexMap<String, Symbol>>,
    events: Vec<EventInfo>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a global builtin symbol.
    pub fn define(&mut self, symbol: Symbol) -> Result<(), SymbolError> {
        if self.symbols.contains_key(&symbol.name) {
            return Err(SymbolError::DuplicateSymbol {
                name: symbol.name,
                span: symbol.span,
            });
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Global builtin symbols in registration order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn register_interface(&mut self, name: impl Into<String>, members: IndexMap<String, Symbol>) {
        self.interfaces.insert(name.into(), members);
    }

    /// Bound members of an interface, if it carried markers.
    pub fn interface(&self, name: &str) -> Option<&IndexMap<String, Symbol>> {
        self.interfaces.get(name)
    }

    pub fn add_event(&mut self, event: EventInfo) {
        self.events.push(event);
    }

    /// Declared events in declaration order.
    pub fn events(&self) -> &[EventInfo] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{BuiltinCall, ScopeId, SymbolDef};
    use contractc_core::Span;

    fn builtin(name: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            scope: ScopeId::BUILTINS,
            span: Span::default(),
            def: SymbolDef::Builtin(BuiltinCall {
                ops: Vec::new(),
                param_count: 0,
                returns_value: false,
                is_property: false,
            }),
        }
    }

    #[test]
    fn duplicate_builtin_is_rejected() {
        let mut registry = BuiltinRegistry::new();
        registry.define(builtin("checkWitness")).unwrap();
        assert!(registry.lookup("checkWitness").is_some());

        let err = registry.define(builtin("checkWitness")).unwrap_err();
        assert!(matches!(err, SymbolError::DuplicateSymbol { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn interfaces_are_separate_from_globals() {
        let mut registry = BuiltinRegistry::new();
        let mut members = IndexMap::new();
        members.insert("time".to_string(), builtin("time"));
        registry.register_interface("RuntimeApi", members);

        assert!(registry.lookup("time").is_none());
        assert!(registry.interface("RuntimeApi").unwrap().contains_key("time"));
        assert!(registry.interface("Other").is_none());
    }
}
