//! contractc - compile typed contract programs to NeoVM scripts.
//!
//! The parser is not part of this crate: callers build a
//! [`Program`](ast::Program) (see [`ast::AstBuilder`]) and hand it to a
//! [`Compiler`].
//!
//! # Example
//!
//! ```ignore
//! use contractc::{CompileOptions, Compiler};
//!
//! let compiler = Compiler::new(CompileOptions::new("Token").with_optimize(true));
//! let contract = compiler.compile(&program)?;
//! println!("{} ({} bytes)", contract.hash, contract.script.len());
//! ```

mod compiler;
mod error;

pub use compiler::{CompiledContract, Compiler};
pub use error::{Error, Result};

pub use contractc_ast as ast;
pub use contractc_compiler::artifacts::{
    AbiEvent, AbiMethod, AbiParameter, ContractAbi, ContractManifest, ContractParamType,
    DebugInfo, DebugMethod, SequencePoint,
};
pub use contractc_compiler::builtins::{NativeContract, Syscall};
pub use contractc_compiler::bytecode::{MethodToken, OpCode, decode};
pub use contractc_compiler::{CompileOptions, emit::EncodedMethod};
pub use contractc_core::{
    BindingError, CompilationError, CompilationErrors, EncodingError, FileId, Hash160,
    LoweringError, Span, SymbolError,
};
