//! Address-agnostic intermediate representation.
//!
//! Lowering produces one append-only list of [`Op`]s per function. Control
//! flow refers to [`Label`]s, zero-size markers placed in the same list, so
//! no operation ever needs to know an address. Addresses are assigned only
//! by the encoder, once every function is frozen.

mod builder;
mod jumps;

pub use builder::{FunctionBuilder, FunctionIr, SlotInfo};
pub use jumps::{BreakError, LoopExit, TryPhase};

use contractc_core::Span;
use num_bigint::BigInt;

use crate::builtins::Syscall;
use crate::bytecode::{OpCode, StackItemType};

/// A jump target inside one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

/// Index of a function in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Storage class of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Argument,
    Local,
    Static,
}

impl SlotKind {
    pub fn name(self) -> &'static str {
        match self {
            SlotKind::Argument => "argument",
            SlotKind::Local => "local",
            SlotKind::Static => "static",
        }
    }
}

/// Branch condition of a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpKind {
    Always,
    IfTrue,
    IfFalse,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl JumpKind {
    /// Opcode with a 4-byte offset.
    pub fn long_opcode(self) -> OpCode {
        match self {
            JumpKind::Always => OpCode::JmpL,
            JumpKind::IfTrue => OpCode::JmpIfL,
            JumpKind::IfFalse => OpCode::JmpIfNotL,
            JumpKind::Eq => OpCode::JmpEqL,
            JumpKind::Ne => OpCode::JmpNeL,
            JumpKind::Gt => OpCode::JmpGtL,
            JumpKind::Ge => OpCode::JmpGeL,
            JumpKind::Lt => OpCode::JmpLtL,
            JumpKind::Le => OpCode::JmpLeL,
        }
    }
}

/// One IR operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Any opcode without an operand.
    Simple(OpCode),
    /// Integer push, encoded in the narrowest form.
    PushInt(BigInt),
    /// Byte-string push, encoded with a 1, 2 or 4 byte length prefix.
    PushData(Vec<u8>),
    PushBool(bool),
    PushNull,
    Convert(StackItemType),
    IsType(StackItemType),
    LoadSlot(SlotKind, u32),
    StoreSlot(SlotKind, u32),
    Jump(JumpKind, Label),
    /// Enter a protected region; an absent handler encodes as offset 0.
    Try {
        catch: Option<Label>,
        finally: Option<Label>,
    },
    /// Leave a protected region, running `finally` first.
    EndTry(Label),
    Call(FunctionId),
    /// `CALLT` with an index into the method-token table.
    CallToken(u16),
    SysCall(Syscall),
    InitSlot {
        locals: u32,
        params: u32,
    },
    InitStaticSlot(u32),
    /// Zero-size jump target.
    Label(Label),
    /// Zero-size source marker for debug mapping.
    Anchor,
    Return,
}

impl Operation {
    /// Whether this operation encodes to no bytes.
    pub fn is_marker(&self) -> bool {
        matches!(self, Operation::Label(_) | Operation::Anchor)
    }

    /// Labels this operation branches to.
    pub fn targets(&self) -> impl Iterator<Item = Label> {
        let (first, second) = match self {
            Operation::Jump(_, label) | Operation::EndTry(label) => (Some(*label), None),
            Operation::Try { catch, finally } => (*catch, *finally),
            _ => (None, None),
        };
        first.into_iter().chain(second)
    }
}

/// An operation with its optional source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub operation: Operation,
    pub location: Option<Span>,
}

impl Op {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            location: None,
        }
    }
}

/// Handle to an emitted operation, for attaching a location later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpHandle(pub(crate) usize);
