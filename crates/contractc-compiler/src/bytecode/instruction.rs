//! Decoding encoded scripts back into instructions.
//!
//! Used by the verifier and by tests to inspect generated code without
//! depending on exact operand bytes.

use num_bigint::BigInt;
use thiserror::Error;

use super::{OpCode, OperandSize};

/// A decoded instruction borrowing its operand from the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'s> {
    /// Address of the opcode byte.
    pub address: usize,
    pub opcode: OpCode,
    /// Operand bytes; for length-prefixed opcodes, the data without prefix.
    pub operand: &'s [u8],
    /// Total encoded size, opcode included.
    pub size: usize,
}

/// Failure to decode a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode 0x{byte:02x} at address {address}")]
    UnknownOpcode { address: usize, byte: u8 },
    #[error("truncated {opcode} at address {address}")]
    Truncated {
        address: usize,
        opcode: &'static str,
    },
}

impl DecodeError {
    pub fn address(&self) -> usize {
        match self {
            DecodeError::UnknownOpcode { address, .. } | DecodeError::Truncated { address, .. } => {
                *address
            }
        }
    }
}

impl<'s> Instruction<'s> {
    /// Decode the instruction starting at `address`.
    pub fn decode(script: &'s [u8], address: usize) -> Result<Self, DecodeError> {
        let byte = script
            .get(address)
            .copied()
            .ok_or(DecodeError::Truncated {
                address,
                opcode: "instruction",
            })?;
        let opcode = OpCode::from_u8(byte).ok_or(DecodeError::UnknownOpcode { address, byte })?;
        let truncated = DecodeError::Truncated {
            address,
            opcode: opcode.name(),
        };

        let (start, len) = match opcode.operand() {
            OperandSize::Fixed(n) => (address + 1, n),
            OperandSize::Prefix(n) => {
                let prefix = script.get(address + 1..address + 1 + n).ok_or_else(|| truncated.clone())?;
                let len = prefix
                    .iter()
                    .rev()
                    .fold(0usize, |acc, b| (acc << 8) | *b as usize);
                (address + 1 + n, len)
            }
        };
        let operand = script.get(start..start + len).ok_or(truncated)?;

        Ok(Self {
            address,
            opcode,
            operand,
            size: start + len - address,
        })
    }

    /// Address of the following instruction.
    pub fn next_address(&self) -> usize {
        self.address + self.size
    }

    /// Absolute targets of a branch instruction.
    ///
    /// `TRY` yields its catch and finally targets; a zero offset means the
    /// handler is absent and is skipped.
    pub fn branch_targets(&self) -> Vec<i64> {
        let base = self.address as i64;
        match self.opcode {
            OpCode::Try => self
                .operand
                .iter()
                .map(|b| *b as i8 as i64)
                .filter(|offset| *offset != 0)
                .map(|offset| base + offset)
                .collect(),
            OpCode::TryL => self
                .operand
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as i64)
                .filter(|offset| *offset != 0)
                .map(|offset| base + offset)
                .collect(),
            op if op.is_branch() => match self.operand {
                [b] => vec![base + *b as i8 as i64],
                [a, b, c, d] => vec![base + i32::from_le_bytes([*a, *b, *c, *d]) as i64],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Integer pushed by a `PUSHINT*`, `PUSHM1` or `PUSH0..16` instruction.
    pub fn push_int(&self) -> Option<BigInt> {
        match self.opcode {
            OpCode::PushInt8
            | OpCode::PushInt16
            | OpCode::PushInt32
            | OpCode::PushInt64
            | OpCode::PushInt128
            | OpCode::PushInt256 => Some(BigInt::from_signed_bytes_le(self.operand)),
            OpCode::PushM1 => Some(BigInt::from(-1)),
            op if (OpCode::Push0 as u8..=OpCode::Push16 as u8).contains(&(op as u8)) => {
                Some(BigInt::from(op as u8 - OpCode::Push0 as u8))
            }
            _ => None,
        }
    }

    /// Data pushed by a `PUSHDATA*` instruction.
    pub fn push_data(&self) -> Option<&'s [u8]> {
        matches!(
            self.opcode,
            OpCode::PushData1 | OpCode::PushData2 | OpCode::PushData4
        )
        .then_some(self.operand)
    }

    /// Little-endian unsigned value of a fixed operand of up to 4 bytes.
    pub fn operand_u32(&self) -> Option<u32> {
        if self.operand.is_empty() || self.operand.len() > 4 {
            return None;
        }
        Some(
            self.operand
                .iter()
                .rev()
                .fold(0u32, |acc, b| (acc << 8) | *b as u32),
        )
    }
}

/// Decode a whole script.
pub fn decode(script: &[u8]) -> Result<Vec<Instruction<'_>>, DecodeError> {
    let mut instructions = Vec::new();
    let mut address = 0;
    while address < script.len() {
        let instruction = Instruction::decode(script, address)?;
        address = instruction.next_address();
        instructions.push(instruction);
    }
    Ok(instructions)
}

/// Extract all opcodes from a script, skipping operands.
///
/// Decoding stops at the first malformed instruction.
pub fn opcodes(script: &[u8]) -> Vec<OpCode> {
    let mut ops = Vec::new();
    let mut address = 0;
    while let Ok(instruction) = Instruction::decode(script, address) {
        ops.push(instruction.opcode);
        address = instruction.next_address();
    }
    ops
}

/// Check that a script contains exactly the given opcode sequence.
///
/// Operand values are ignored. Panics with both sequences on mismatch.
#[track_caller]
pub fn assert_opcodes(script: &[u8], expected: &[OpCode]) {
    let actual = opcodes(script);
    assert_eq!(
        actual,
        expected,
        "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
        expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
        actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
    );
}
