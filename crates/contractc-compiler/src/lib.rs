//! Contract compiler backend.
//!
//! Lowers a typed contract [`Program`] to a NeoVM script in five passes:
//!
//! - **Builtins**: bind marker-carrying declarations to host calls
//! - **Declarations**: build the global scope
//! - **Lowering**: lower every function body into IR
//! - **Encoding**: resolve addresses and encode, optionally shortening
//!   branches, then verify the result
//! - **Artifacts**: assemble the manifest, debug info and contract hash
//!
//! Each pass accumulates its diagnostics; the pipeline stops after the first
//! pass that reported any.
//!
//! ## Modules
//!
//! - [`artifacts`]: manifest, ABI and debug info
//! - [`builtins`]: syscalls, native contracts and marker parsing
//! - [`bytecode`]: opcodes, instructions and the method-token table
//! - [`context`]: per-compilation state
//! - [`emit`]: address resolution, encoding and verification
//! - [`expr`] / [`stmt`]: lowering
//! - [`ir`]: operations and the function builder
//! - [`passes`]: the pipeline stages
//! - [`scope`]: lexical scopes and symbols

pub mod artifacts;
pub mod builtins;
pub mod bytecode;
pub mod context;
pub mod emit;
pub mod expr;
pub mod ir;
pub mod passes;
pub mod scope;
pub mod stmt;

pub use artifacts::{ContractManifest, ContractParamType, DebugInfo};
pub use bytecode::{MethodToken, OpCode};
pub use context::CompilationContext;
pub use expr::ExprCompiler;
pub use ir::{FunctionBuilder, FunctionIr, Operation};
pub use scope::{Scope, Symbol, SymbolDef};
pub use stmt::StmtCompiler;

pub use contractc_core::{CompilationError, CompilationErrors, Hash160};

use contractc_ast::Program;
use serde::Deserialize;
use tracing::debug;

use crate::artifacts::AssemblyInput;
use crate::emit::EncodedMethod;
use crate::passes::{BuiltinsPass, DeclarationPass, EncodingPass, LoweringPass};

/// Compilation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Contract name written to the manifest.
    pub name: String,
    /// Shorten branches whose offsets fit one byte.
    pub optimize: bool,
    /// Produce [`DebugInfo`].
    pub debug_info: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            name: "Contract".to_string(),
            optimize: false,
            debug_info: true,
        }
    }
}

impl CompileOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }
}

/// Everything produced for one contract.
#[derive(Debug, Clone)]
pub struct CompilerOutput {
    pub script: Vec<u8>,
    /// Byte ranges of every function, in declaration order.
    pub methods: Vec<EncodedMethod>,
    /// Method tokens in first-use order.
    pub tokens: Vec<MethodToken>,
    pub manifest: ContractManifest,
    pub debug_info: Option<DebugInfo>,
    pub hash: Hash160,
}

/// Compile a program.
///
/// # Errors
///
/// Every diagnostic of the first pass that reported any.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(
    program: &Program<'_>,
    options: &CompileOptions,
) -> Result<CompilerOutput, CompilationErrors> {
    debug!(contract = %options.name, optimize = options.optimize, "compiling contract");
    let mut ctx = CompilationContext::new();

    let registry = BuiltinsPass::new(&mut ctx).run(program);
    ctx.checkpoint()?;

    let decls = DeclarationPass::new(&mut ctx, &registry).run(program);
    ctx.checkpoint()?;

    let functions = LoweringPass::new(&mut ctx).run(&decls);
    ctx.checkpoint()?;

    let encoded = EncodingPass::new(&mut ctx)
        .with_optimize(options.optimize)
        .run(&functions);
    let Some(encoded) = encoded else {
        return Err(ctx.take_errors());
    };

    let artifacts = artifacts::assemble(&AssemblyInput {
        name: &options.name,
        program,
        functions: &functions,
        encoded: &encoded,
        events: registry.events(),
        statics: &decls.static_slots(),
        debug_info: options.debug_info,
    });

    debug!(
        contract = %options.name,
        size = encoded.script.len(),
        hash = %artifacts.hash,
        "contract compiled"
    );
    Ok(CompilerOutput {
        script: encoded.script,
        methods: encoded.methods,
        tokens: ctx.into_tokens().into_tokens(),
        manifest: artifacts.manifest,
        debug_info: artifacts.debug_info,
        hash: artifacts.hash,
    })
}
