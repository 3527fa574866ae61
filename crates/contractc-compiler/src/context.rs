//! CompilationContext - state threaded through every pass.
//!
//! Holds the accumulated diagnostics and the method-token table, the only
//! resource shared between functions during lowering.

use contractc_core::{CompilationError, CompilationErrors};

use crate::bytecode::TokenTable;

/// Per-compilation state passed explicitly to each pass.
#[derive(Debug, Default)]
pub struct CompilationContext {
    errors: Vec<CompilationError>,
    tokens: TokenTable,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and keep going.
    pub fn add_error(&mut self, error: impl Into<CompilationError>) {
        self.errors.push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompilationError] {
        &self.errors
    }

    /// Drain the diagnostics collected so far.
    pub fn take_errors(&mut self) -> CompilationErrors {
        CompilationErrors::new(std::mem::take(&mut self.errors))
    }

    /// Fail with every collected diagnostic, if any.
    ///
    /// Called between passes: later passes assume the invariants earlier
    /// ones establish.
    pub fn checkpoint(&mut self) -> Result<(), CompilationErrors> {
        if self.has_errors() {
            Err(self.take_errors())
        } else {
            Ok(())
        }
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut TokenTable {
        &mut self.tokens
    }

    pub fn into_tokens(self) -> TokenTable {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractc_core::{Span, SymbolError};

    #[test]
    fn checkpoint_drains_errors() {
        let mut ctx = CompilationContext::new();
        assert!(ctx.checkpoint().is_ok());

        ctx.add_error(SymbolError::UnresolvedSymbol {
            name: "a".into(),
            span: Span::default(),
        });
        ctx.add_error(SymbolError::UnresolvedSymbol {
            name: "b".into(),
            span: Span::default(),
        });

        let errors = ctx.checkpoint().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(!ctx.has_errors());
    }
}
