//! Bytecode types for the NeoVM target.
//!
//! - [`OpCode`] - the instruction set and its operand layout
//! - [`StackItemType`] and [`CallFlags`] - typed operands
//! - [`Instruction`] - decoded view of an encoded script
//! - [`MethodToken`] and [`TokenTable`] - external method references

mod instruction;
mod opcode;
mod token;
mod types;

pub use instruction::{DecodeError, Instruction, assert_opcodes, decode, opcodes};
pub use opcode::{OpCode, OperandSize};
pub use token::{MethodToken, TokenTable};
pub use types::{CallFlags, StackItemType};
