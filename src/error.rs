use thiserror::Error;

use contractc_core::CompilationErrors;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the facade.
#[derive(Debug, Error)]
pub enum Error {
    /// The program did not compile.
    #[error("compilation failed:\n{0}")]
    Compilation(#[from] CompilationErrors),

    /// An artifact could not be serialized.
    #[error("failed to serialize {what}: {source}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// The compiler diagnostics, if this is a compilation failure.
    pub fn diagnostics(&self) -> Option<&CompilationErrors> {
        match self {
            Error::Compilation(errors) => Some(errors),
            Error::Serialization { .. } => None,
        }
    }
}
