//! Unified error types for the contract compiler.
//!
//! Every pass reports its own error type; all of them convert into
//! [`CompilationError`] so a pipeline can collect diagnostics uniformly.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompilationError (top-level wrapper)
//! ├── SymbolError    - scope building and name resolution
//! ├── BindingError   - builtin annotation binding
//! ├── LoweringError  - statement/expression lowering
//! └── EncodingError  - address resolution and byte encoding
//! ```
//!
//! A pass keeps going after an error in one declaration so that all
//! independent problems are reported together; [`CompilationErrors`] is the
//! list handed back to the caller when a pass fails.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Symbol Errors
// ============================================================================

/// Errors raised while building scopes or resolving identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// A name was defined twice in the same scope.
    #[error("at {span}: duplicate symbol '{name}'")]
    DuplicateSymbol {
        /// The duplicated name.
        name: String,
        /// Where the second definition occurred.
        span: Span,
    },

    /// An identifier did not resolve in any enclosing scope.
    #[error("at {span}: unresolved symbol '{name}'")]
    UnresolvedSymbol {
        /// The identifier that was not found.
        name: String,
        /// Where the identifier was used.
        span: Span,
    },

    /// A top-level constant was initialized with something other than a literal.
    #[error("at {span}: constant '{name}' must be initialized with a literal")]
    InvalidConstant {
        /// The constant name.
        name: String,
        /// Where the initializer occurred.
        span: Span,
    },
}

impl SymbolError {
    pub fn span(&self) -> Span {
        match self {
            SymbolError::DuplicateSymbol { span, .. } => *span,
            SymbolError::UnresolvedSymbol { span, .. } => *span,
            SymbolError::InvalidConstant { span, .. } => *span,
        }
    }
}

// ============================================================================
// Binding Errors
// ============================================================================

/// Errors raised while binding annotated declarations to host calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// An annotation (or its payload) does not match anything the target
    /// machine provides.
    #[error("at {span}: unsupported builtin '{name}': {reason}")]
    UnsupportedBuiltin {
        /// The annotated declaration or annotation tag.
        name: String,
        /// What was not recognized.
        reason: String,
        /// Where the declaration occurred.
        span: Span,
    },

    /// A recognized marker carried a payload that could not be parsed.
    #[error("at {span}: malformed @{tag} annotation: {message}")]
    MalformedAnnotation {
        /// The marker tag without the leading `@`.
        tag: String,
        /// What is wrong with the payload.
        message: String,
        /// Where the annotation occurred.
        span: Span,
    },
}

impl BindingError {
    pub fn span(&self) -> Span {
        match self {
            BindingError::UnsupportedBuiltin { span, .. } => *span,
            BindingError::MalformedAnnotation { span, .. } => *span,
        }
    }
}

// ============================================================================
// Lowering Errors
// ============================================================================

/// Errors raised while lowering statements and expressions into IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    /// The node kind has no lowering.
    #[error("at {span}: unsupported syntax '{kind}'")]
    UnsupportedSyntax {
        /// The node kind name.
        kind: String,
        /// Where the node occurred.
        span: Span,
    },

    /// The operator cannot be applied to the operand type.
    #[error("at {span}: operator '{op}' is not supported for type '{ty}'")]
    UnsupportedOperator {
        /// The operator token.
        op: String,
        /// The operand type.
        ty: String,
        /// Where the expression occurred.
        span: Span,
    },

    /// A symbol was used in a position its kind does not allow.
    #[error("at {span}: '{name}' is a {kind} and cannot be used here")]
    InvalidSymbolUse {
        /// The symbol name.
        name: String,
        /// The symbol kind.
        kind: String,
        /// Where the symbol was used.
        span: Span,
    },

    /// A call passes a different number of arguments than the callee takes.
    #[error("at {span}: '{name}' takes {expected} argument(s) but {found} were given")]
    ArgumentCount {
        /// The callee name.
        name: String,
        /// Parameters the callee declares.
        expected: u32,
        /// Arguments at the call site.
        found: usize,
        /// Where the call occurred.
        span: Span,
    },

    /// Assignment to something that is not a variable.
    #[error("at {span}: cannot assign to '{name}'")]
    AssignToConstant {
        /// The assigned name.
        name: String,
        /// Where the assignment occurred.
        span: Span,
    },

    /// `break` or `continue` outside of a loop.
    #[error("at {span}: '{keyword}' outside of a loop")]
    ControlFlowOutsideLoop {
        /// `break` or `continue`.
        keyword: String,
        /// Where the statement occurred.
        span: Span,
    },
}

impl LoweringError {
    pub fn span(&self) -> Span {
        match self {
            LoweringError::UnsupportedSyntax { span, .. } => *span,
            LoweringError::UnsupportedOperator { span, .. } => *span,
            LoweringError::InvalidSymbolUse { span, .. } => *span,
            LoweringError::ArgumentCount { span, .. } => *span,
            LoweringError::AssignToConstant { span, .. } => *span,
            LoweringError::ControlFlowOutsideLoop { span, .. } => *span,
        }
    }
}

// ============================================================================
// Encoding Errors
// ============================================================================

/// Errors raised while sizing, addressing and encoding instructions.
///
/// Encoding errors may come from compiler-synthesized code with no source
/// position, so the span is optional.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// An operand does not fit the largest encoding available.
    #[error("in '{function}': {what} of {size} exceeds the maximum of {max}")]
    OperandTooLarge {
        /// The function being encoded.
        function: String,
        /// What overflowed (push data, integer, slot index, ...).
        what: String,
        /// The offending size or value.
        size: u64,
        /// The largest encodable size or value.
        max: u64,
        /// Source location, if known.
        span: Option<Span>,
    },

    /// A jump, try, call or token reference whose target does not exist.
    #[error("in '{function}': {what} targets nothing")]
    InvalidTarget {
        /// The function being encoded.
        function: String,
        /// Description of the dangling reference.
        what: String,
        /// Source location, if known.
        span: Option<Span>,
    },

    /// The script grew past what relative offsets can address.
    #[error("script size {size} exceeds the addressable maximum of {max}")]
    BufferOverflow {
        /// The script size in bytes.
        size: u64,
        /// The largest addressable size.
        max: u64,
    },

    /// An operation carried an opcode that does not belong in it.
    #[error("in '{function}': {message}")]
    InvalidOperand {
        /// The function being encoded.
        function: String,
        /// Description of the problem.
        message: String,
    },

    /// The encoded script failed independent verification.
    #[error("verification failed at address {address}: {message}")]
    VerificationFailed {
        /// Address of the offending instruction.
        address: usize,
        /// Description of the problem.
        message: String,
    },
}

impl EncodingError {
    pub fn span(&self) -> Option<Span> {
        match self {
            EncodingError::OperandTooLarge { span, .. } => *span,
            EncodingError::InvalidTarget { span, .. } => *span,
            EncodingError::BufferOverflow { .. }
            | EncodingError::InvalidOperand { .. }
            | EncodingError::VerificationFailed { .. } => None,
        }
    }
}

// ============================================================================
// Top-level
// ============================================================================

/// Any error produced by the compiler backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Lowering(#[from] LoweringError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl CompilationError {
    /// Get the span where this error occurred, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompilationError::Symbol(e) => Some(e.span()),
            CompilationError::Binding(e) => Some(e.span()),
            CompilationError::Lowering(e) => Some(e.span()),
            CompilationError::Encoding(e) => e.span(),
        }
    }

    /// Short name of the error category.
    pub fn category(&self) -> &'static str {
        match self {
            CompilationError::Symbol(_) => "symbol",
            CompilationError::Binding(_) => "builtin binding",
            CompilationError::Lowering(_) => "lowering",
            CompilationError::Encoding(_) => "encoding",
        }
    }
}

/// All errors reported by a failing pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationErrors {
    errors: Vec<CompilationError>,
}

impl CompilationErrors {
    pub fn new(errors: Vec<CompilationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[CompilationError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilationError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<CompilationError> {
        self.errors
    }
}

impl From<CompilationError> for CompilationErrors {
    fn from(error: CompilationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for CompilationErrors {
    type Item = CompilationError;
    type IntoIter = std::vec::IntoIter<CompilationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for CompilationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} error: {}", error.category(), error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompilationErrors {}
