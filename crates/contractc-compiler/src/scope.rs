//! Lexical scopes and symbol definitions.
//!
//! A [`Scope`] borrows its parent, so the chain of scopes mirrors the Rust
//! call stack of the lowering code: a block opens a child scope, lowers its
//! statements, and drops it. Resolution walks the chain outwards and falls
//! back to the [`BuiltinRegistry`] only at the root.
//!
//! Expected misses are reported by [`Scope::lookup`] as `None`; only
//! [`Scope::resolve`] turns a miss into an [`SymbolError::UnresolvedSymbol`].

use std::cell::Cell;
use std::rc::Rc;

use contractc_core::{Hash160, Span, SymbolError};
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::builtins::BuiltinRegistry;
use crate::bytecode::CallFlags;
use crate::ir::{FunctionId, Operation, SlotKind};

/// Identity of a scope within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// Owner of every symbol in the builtin registry.
    pub const BUILTINS: ScopeId = ScopeId(0);
}

/// Value of a compile-time constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    Int(BigInt),
    Bool(bool),
    Bytes(Vec<u8>),
    Null,
}

impl ConstantValue {
    /// The single operation pushing this value.
    pub fn push_operation(&self) -> Operation {
        match self {
            ConstantValue::Int(value) => Operation::PushInt(value.clone()),
            ConstantValue::Bool(value) => Operation::PushBool(*value),
            ConstantValue::Bytes(bytes) => Operation::PushData(bytes.clone()),
            ConstantValue::Null => Operation::PushNull,
        }
    }
}

/// A fixed operation sequence standing in for a host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinCall {
    pub ops: Vec<Operation>,
    pub param_count: u32,
    pub returns_value: bool,
    /// Accessed as a property rather than called.
    pub is_property: bool,
}

/// A method on another contract, called through `CALLT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTokenRef {
    pub hash: Hash160,
    pub method: String,
    pub param_count: u16,
    pub returns_value: bool,
    pub call_flags: CallFlags,
    pub is_property: bool,
}

/// What a name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolDef {
    /// A function compiled from source.
    Function {
        id: FunctionId,
        param_count: u32,
        returns_value: bool,
    },
    /// An argument, local or static slot.
    Variable {
        kind: SlotKind,
        index: u32,
        mutable: bool,
    },
    Constant(ConstantValue),
    Builtin(BuiltinCall),
    /// A notification raised through `System.Runtime.Notify`.
    Event { name: String, param_count: u32 },
    MethodToken(MethodTokenRef),
    /// A global object whose members are builtins.
    Object { members: IndexMap<String, Symbol> },
}

impl SymbolDef {
    /// Human-readable kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SymbolDef::Function { .. } => "function",
            SymbolDef::Variable { .. } => "variable",
            SymbolDef::Constant(_) => "constant",
            SymbolDef::Builtin(_) => "builtin",
            SymbolDef::Event { .. } => "event",
            SymbolDef::MethodToken(_) => "method token",
            SymbolDef::Object { .. } => "object",
        }
    }
}

/// A named definition bound to the scope that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub scope: ScopeId,
    pub span: Span,
    pub def: SymbolDef,
}

/// A lexical scope.
#[derive(Debug)]
pub struct Scope<'p> {
    id: ScopeId,
    name: String,
    parent: Option<&'p Scope<'p>>,
    /// Set on the root scope only.
    builtins: Option<&'p BuiltinRegistry>,
    symbols: IndexMap<String, Symbol>,
    next_id: Rc<Cell<u32>>,
}

impl<'p> Scope<'p> {
    /// Create the root scope of a compilation.
    pub fn root(name: impl Into<String>, builtins: &'p BuiltinRegistry) -> Self {
        let next_id = Rc::new(Cell::new(ScopeId::BUILTINS.0 + 1));
        Self {
            id: Self::allocate_id(&next_id),
            name: name.into(),
            parent: None,
            builtins: Some(builtins),
            symbols: IndexMap::new(),
            next_id,
        }
    }

    /// Open a nested scope.
    pub fn child<'c>(&'c self, name: impl Into<String>) -> Scope<'c> {
        Scope {
            id: Self::allocate_id(&self.next_id),
            name: name.into(),
            parent: Some(self),
            builtins: None,
            symbols: IndexMap::new(),
            next_id: Rc::clone(&self.next_id),
        }
    }

    fn allocate_id(next_id: &Cell<u32>) -> ScopeId {
        let id = next_id.get();
        next_id.set(id + 1);
        ScopeId(id)
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&'p Scope<'p>> {
        self.parent
    }

    /// Symbols defined directly in this scope, in definition order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Define a symbol in this scope.
    ///
    /// `factory` runs only when the name is free, so it may allocate
    /// resources such as a slot index.
    pub fn define(
        &mut self,
        name: &str,
        span: Span,
        factory: impl FnOnce() -> SymbolDef,
    ) -> Result<&Symbol, SymbolError> {
        let taken = self.symbols.contains_key(name)
            || self.builtins.is_some_and(|b| b.lookup(name).is_some());
        if taken {
            return Err(SymbolError::DuplicateSymbol {
                name: name.to_string(),
                span,
            });
        }

        let symbol = Symbol {
            name: name.to_string(),
            scope: self.id,
            span,
            def: factory(),
        };
        let entry = self.symbols.entry(name.to_string()).or_insert(symbol);
        Ok(&*entry)
    }

    /// Find a symbol by name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        if let Some(symbol) = self.symbols.get(name) {
            return Some(symbol);
        }
        match (self.parent, self.builtins) {
            (Some(parent), _) => parent.lookup(name),
            (None, Some(builtins)) => builtins.lookup(name),
            (None, None) => None,
        }
    }

    /// Like [`lookup`](Self::lookup), but a miss is an error.
    pub fn resolve(&self, name: &str, span: Span) -> Result<&Symbol, SymbolError> {
        self.lookup(name)
            .ok_or_else(|| SymbolError::UnresolvedSymbol {
                name: name.to_string(),
                span,
            })
    }
}
