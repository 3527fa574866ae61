//! Artifact assembly: manifest, ABI, debug info and contract hash.
//!
//! Runs last, over the encoded script. Nothing here can fail: every address
//! and index was validated by the encoder.

mod debug_info;
mod manifest;

pub use debug_info::{
    DebugEvent, DebugInfo, DebugMethod, DebugSlot, MethodRange, SequencePoint,
};
pub use manifest::{
    AbiEvent, AbiMethod, AbiParameter, ContractAbi, ContractManifest, ContractParamType,
    ContractPermission,
};

use contractc_ast::Program;
use contractc_core::{FileId, Hash160};
use rustc_hash::FxHashMap;

use crate::builtins::EventInfo;
use crate::emit::EncodedScript;
use crate::ir::{FunctionIr, SlotInfo};

/// Everything assembly reads.
pub struct AssemblyInput<'a, 'ast> {
    /// Contract name for the manifest and debug ids.
    pub name: &'a str,
    pub program: &'a Program<'ast>,
    /// Frozen functions, index-aligned with `encoded.methods`.
    pub functions: &'a [FunctionIr],
    pub encoded: &'a EncodedScript,
    pub events: &'a [EventInfo],
    pub statics: &'a [SlotInfo],
    /// Build [`DebugInfo`] as well.
    pub debug_info: bool,
}

/// Assembled artifacts.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub manifest: ContractManifest,
    pub debug_info: Option<DebugInfo>,
    pub hash: Hash160,
}

/// Build the manifest, debug info and hash of an encoded contract.
pub fn assemble(input: &AssemblyInput<'_, '_>) -> Artifacts {
    let hash = Hash160::from_script(&input.encoded.script);

    let methods = input
        .functions
        .iter()
        .zip(&input.encoded.methods)
        .filter(|(function, _)| function.is_export)
        .map(|(function, method)| AbiMethod {
            name: function.name.clone(),
            parameters: function.params.iter().map(abi_parameter).collect(),
            return_type: function.return_type,
            offset: method.start as u32,
            safe: function.is_safe,
        })
        .collect();
    let events = input
        .events
        .iter()
        .map(|event| AbiEvent {
            name: event.name.clone(),
            parameters: event.params.iter().map(abi_parameter).collect(),
        })
        .collect();
    let manifest = ContractManifest::new(input.name, ContractAbi { methods, events });

    let debug_info = input.debug_info.then(|| build_debug_info(input, hash));

    Artifacts {
        manifest,
        debug_info,
        hash,
    }
}

fn abi_parameter(slot: &SlotInfo) -> AbiParameter {
    AbiParameter {
        name: slot.name.clone(),
        ty: slot.ty,
    }
}

fn debug_slot(slot: &SlotInfo) -> DebugSlot {
    DebugSlot {
        name: slot.name.clone(),
        ty: slot.ty,
    }
}

fn build_debug_info(input: &AssemblyInput<'_, '_>, hash: Hash160) -> DebugInfo {
    let mut documents: Vec<String> = Vec::new();
    let mut document_index: FxHashMap<FileId, usize> = FxHashMap::default();

    let methods = input
        .functions
        .iter()
        .zip(&input.encoded.methods)
        .map(|(function, method)| {
            let sequence_points = method
                .sequence_points
                .iter()
                .map(|(address, span)| {
                    let document = *document_index.entry(span.file).or_insert_with(|| {
                        let path = input
                            .program
                            .file_path(span.file)
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("<file {}>", span.file.0));
                        documents.push(path);
                        documents.len() - 1
                    });
                    SequencePoint::new(*address as u32, document, *span)
                })
                .collect();

            DebugMethod {
                id: format!("{},{}", input.name, function.name),
                name: function.name.clone(),
                range: MethodRange {
                    start: method.start as u32,
                    end: method.end.saturating_sub(1) as u32,
                },
                params: function.params.iter().map(debug_slot).collect(),
                return_type: function.return_type,
                variables: function.locals.iter().map(debug_slot).collect(),
                sequence_points,
            }
        })
        .collect();

    let events = input
        .events
        .iter()
        .map(|event| DebugEvent {
            id: format!("{},{}", input.name, event.name),
            name: event.name.clone(),
            params: event.params.iter().map(debug_slot).collect(),
        })
        .collect();

    DebugInfo {
        hash,
        documents,
        methods,
        events,
        static_variables: input.statics.iter().map(debug_slot).collect(),
    }
}
