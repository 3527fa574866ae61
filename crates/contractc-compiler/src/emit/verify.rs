//! Independent check of an encoded script.
//!
//! Decodes the script from scratch, without looking at the IR, and checks
//! that:
//! - every byte decodes and no instruction straddles a method boundary
//! - every branch lands on an instruction boundary inside its own method
//! - every call lands on the first instruction of a method
//! - every `CALLT` index is inside the token table

use rustc_hash::FxHashSet;

use super::{EncodedScript, Result};
use crate::bytecode::{Instruction, OpCode};
use contractc_core::EncodingError;

/// Verify `encoded` against a token table of `token_count` entries.
pub fn verify(encoded: &EncodedScript, token_count: usize) -> Result<()> {
    let script = &encoded.script;
    let starts: FxHashSet<usize> = encoded.methods.iter().map(|m| m.start).collect();

    for method in &encoded.methods {
        let mut boundaries = FxHashSet::default();
        let mut instructions = Vec::new();
        let mut address = method.start;

        while address < method.end {
            let instruction = Instruction::decode(script, address).map_err(|e| {
                EncodingError::VerificationFailed {
                    address: e.address(),
                    message: e.to_string(),
                }
            })?;
            if instruction.next_address() > method.end {
                return Err(fail(
                    address,
                    format!("{} crosses the end of '{}'", instruction.opcode.name(), method.name),
                ));
            }
            boundaries.insert(address);
            address = instruction.next_address();
            instructions.push(instruction);
        }

        for instruction in &instructions {
            check_instruction(instruction, &boundaries, &starts, token_count, &method.name)?;
        }
    }

    if let Some(last) = encoded.methods.last()
        && last.end != script.len()
    {
        return Err(fail(last.end, "trailing bytes after the last method".to_string()));
    }
    Ok(())
}

fn check_instruction(
    instruction: &Instruction<'_>,
    boundaries: &FxHashSet<usize>,
    starts: &FxHashSet<usize>,
    token_count: usize,
    method: &str,
) -> Result<()> {
    let address = instruction.address;
    match instruction.opcode {
        OpCode::Call | OpCode::CallL => {
            for target in instruction.branch_targets() {
                if !usize::try_from(target).is_ok_and(|t| starts.contains(&t)) {
                    return Err(fail(address, format!("call to {target} is not a method entry")));
                }
            }
        }
        OpCode::CallT => {
            let index = instruction.operand_u32().unwrap_or(u32::MAX) as usize;
            if index >= token_count {
                return Err(fail(
                    address,
                    format!("token {index} outside a table of {token_count}"),
                ));
            }
        }
        op if op.is_branch() => {
            for target in instruction.branch_targets() {
                if !usize::try_from(target).is_ok_and(|t| boundaries.contains(&t)) {
                    return Err(fail(
                        address,
                        format!("{} to {target} leaves '{method}' or splits an instruction", op.name()),
                    ));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn fail(address: usize, message: String) -> EncodingError {
    EncodingError::VerificationFailed { address, message }
}
