//! Compiler passes.
//!
//! - [`builtins`]: Pass 0 - bind marker-carrying declarations to host calls
//! - [`declarations`]: Pass 1 - build the global scope
//! - [`lowering`]: Pass 2 - lower function bodies into IR
//! - [`encoding`]: Pass 3 - lay out, encode and verify the script
//!
//! Each pass records its diagnostics in the [`CompilationContext`]; the
//! driver checks for errors between passes.
//!
//! [`CompilationContext`]: crate::context::CompilationContext

pub mod builtins;
pub mod declarations;
pub mod encoding;
pub mod lowering;

pub use builtins::BuiltinsPass;
pub use declarations::{DeclarationPass, Declarations, INITIALIZE};
pub use encoding::EncodingPass;
pub use lowering::LoweringPass;
