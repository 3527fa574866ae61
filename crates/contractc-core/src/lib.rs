//! Core types shared by the contract compiler crates.
//!
//! - [`Span`] / [`FileId`] - source locations
//! - [`CompilationError`] and the per-pass error enums
//! - [`Hash160`] - script hashes and the contract hash function

pub mod error;
pub mod hash;
pub mod span;

pub use error::{
    BindingError, CompilationError, CompilationErrors, EncodingError, LoweringError, SymbolError,
};
pub use hash::{Hash160, ParseHashError};
pub use span::{FileId, Span};
