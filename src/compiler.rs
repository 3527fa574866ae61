//! The [`Compiler`] facade and its output.

use contractc_ast::Program;
use contractc_compiler::CompileOptions;
use contractc_compiler::artifacts::{ContractManifest, DebugInfo};
use contractc_compiler::bytecode::MethodToken;
use contractc_compiler::emit::EncodedMethod;
use contractc_core::Hash160;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

/// Compiles programs with fixed options.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one program into a contract.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, program: &Program<'_>) -> Result<CompiledContract> {
        let output = contractc_compiler::compile(program, &self.options)?;
        info!(
            contract = %self.options.name,
            size = output.script.len(),
            methods = output.methods.len(),
            tokens = output.tokens.len(),
            "compiled"
        );

        Ok(CompiledContract {
            script: output.script,
            methods: output.methods,
            tokens: output.tokens,
            manifest: output.manifest,
            debug_info: output.debug_info,
            hash: output.hash,
        })
    }
}

/// A compiled contract.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledContract {
    pub script: Vec<u8>,
    /// Byte ranges of every function, including non-exported ones.
    #[serde(skip)]
    pub methods: Vec<EncodedMethod>,
    pub tokens: Vec<MethodToken>,
    pub manifest: ContractManifest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
    /// RIPEMD160(SHA256(script)).
    pub hash: Hash160,
}

impl CompiledContract {
    /// The contract hash as `0x`-prefixed, byte-reversed hex.
    pub fn hash_hex(&self) -> String {
        self.hash.to_string()
    }

    /// Byte range of a function by name.
    pub fn method(&self, name: &str) -> Option<&EncodedMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn manifest_json(&self) -> Result<String> {
        self.manifest.to_json().map_err(|source| Error::Serialization {
            what: "manifest",
            source,
        })
    }

    /// `None` when compiled without debug info.
    pub fn debug_info_json(&self) -> Option<Result<String>> {
        self.debug_info.as_ref().map(|debug| {
            debug.to_json().map_err(|source| Error::Serialization {
                what: "debug info",
                source,
            })
        })
    }
}
