//! Address resolution and byte encoding.
//!
//! The [`Encoder`] turns the frozen IR of every function into one contract
//! script in two passes:
//!
//! 1. **Layout**: every operation gets a size from the static opcode table
//!    (plus payload length for data pushes) and an address; labels take the
//!    address of the next instruction. Functions are laid out back to back in
//!    declaration order.
//! 2. **Encoding**: operations are written with their operands resolved
//!    against the layout. Branches use the 4-byte form unless
//!    [`shorten_jumps`](Encoder::shorten_jumps) proved the 1-byte form fits.
//!
//! A branch, call or token reference that does not resolve is an
//! [`EncodingError::InvalidTarget`]; nothing is ever defaulted to offset 0.
//!
//! # Example
//!
//! ```ignore
//! let mut encoder = Encoder::new(&functions, &tokens);
//! encoder.shorten_jumps()?;
//! let encoded = encoder.encode()?;
//! verify::verify(&encoded, tokens.len())?;
//! ```

mod short_jumps;
pub mod verify;

use contractc_core::{EncodingError, Span};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::bytecode::{OpCode, TokenTable};
use crate::ir::{FunctionId, FunctionIr, Label, Operation, SlotKind};

type Result<T> = std::result::Result<T, EncodingError>;

/// Largest script whose relative offsets fit a signed 32-bit operand.
pub const MAX_SCRIPT_SIZE: usize = i32::MAX as usize;

/// Widths available for integer pushes, in bytes.
const INT_WIDTHS: [(usize, OpCode); 6] = [
    (1, OpCode::PushInt8),
    (2, OpCode::PushInt16),
    (4, OpCode::PushInt32),
    (8, OpCode::PushInt64),
    (16, OpCode::PushInt128),
    (32, OpCode::PushInt256),
];

/// One encoded function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMethod {
    pub id: FunctionId,
    pub name: String,
    /// Address of the first byte.
    pub start: usize,
    /// Address one past the last byte.
    pub end: usize,
    /// Source locations by address, ascending, at most one per address.
    pub sequence_points: Vec<(usize, Span)>,
}

/// The contract script with per-method ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedScript {
    pub script: Vec<u8>,
    pub methods: Vec<EncodedMethod>,
}

impl EncodedScript {
    pub fn method(&self, name: &str) -> Option<&EncodedMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Addresses assigned by the layout pass.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Start address per function.
    starts: Vec<usize>,
    /// Address per operation, per function.
    addresses: Vec<Vec<usize>>,
    /// Label addresses, per function.
    labels: Vec<FxHashMap<Label, usize>>,
    size: usize,
}

impl Layout {
    /// Total script size.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn function_start(&self, id: FunctionId) -> Option<usize> {
        self.starts.get(id.index()).copied()
    }

    /// Address one past the end of the function at `index`.
    fn function_end(&self, index: usize) -> usize {
        self.starts.get(index + 1).copied().unwrap_or(self.size)
    }
}

/// Encodes a set of frozen functions into one script.
pub struct Encoder<'a> {
    functions: &'a [FunctionIr],
    tokens: &'a TokenTable,
    /// Per function, indices of branch operations using the 1-byte form.
    short: Vec<FxHashSet<usize>>,
}

impl<'a> Encoder<'a> {
    /// `functions` must be in declaration order, each at the index of its id.
    pub fn new(functions: &'a [FunctionIr], tokens: &'a TokenTable) -> Self {
        Self {
            functions,
            tokens,
            short: vec![FxHashSet::default(); functions.len()],
        }
    }

    /// Number of branch operations currently using the 1-byte form.
    pub fn short_count(&self) -> usize {
        self.short.iter().map(FxHashSet::len).sum()
    }

    fn is_short(&self, function: usize, index: usize) -> bool {
        self.short[function].contains(&index)
    }

    // ==========================================================================
    // Pass 1: layout
    // ==========================================================================

    /// Assign an address to every operation and label.
    pub fn layout(&self) -> Result<Layout> {
        let mut errors = Vec::new();
        let (layout, _) = self.layout_each(&mut errors);
        match errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(layout),
        }
    }

    /// Lay out every function, recording the first sizing error of each.
    ///
    /// Returns the layout and, per function, whether it laid out cleanly.
    fn layout_each(&self, errors: &mut Vec<EncodingError>) -> (Layout, Vec<bool>) {
        let mut layout = Layout::default();
        let mut laid_out = Vec::with_capacity(self.functions.len());
        let mut address = 0usize;

        for (f, function) in self.functions.iter().enumerate() {
            layout.starts.push(address);
            let mut addresses = Vec::with_capacity(function.ops.len());
            let mut labels = FxHashMap::default();
            let mut ok = true;

            for (i, op) in function.ops.iter().enumerate() {
                addresses.push(address);
                if let Operation::Label(label) = op.operation {
                    labels.insert(label, address);
                }
                match self.op_size(f, i, &op.operation) {
                    Ok(size) => address += size,
                    Err(e) => {
                        errors.push(with_span(e, op.location));
                        ok = false;
                        break;
                    }
                }
            }

            layout.addresses.push(addresses);
            layout.labels.push(labels);
            laid_out.push(ok);
        }

        if address > MAX_SCRIPT_SIZE {
            errors.push(EncodingError::BufferOverflow {
                size: address as u64,
                max: MAX_SCRIPT_SIZE as u64,
            });
        }
        layout.size = address;
        (layout, laid_out)
    }

    /// Encoded size of one operation.
    fn op_size(&self, function: usize, index: usize, operation: &Operation) -> Result<usize> {
        let branch = |short: OpCode, long: OpCode| {
            if self.is_short(function, index) {
                short.header_size()
            } else {
                long.header_size()
            }
        };

        let size = match operation {
            Operation::Label(_) | Operation::Anchor => 0,
            Operation::Simple(_)
            | Operation::PushBool(_)
            | Operation::PushNull
            | Operation::Return => 1,
            Operation::PushInt(value) => self.push_int_opcode(function, value)?.header_size(),
            Operation::PushData(data) => {
                let (opcode, _) = self.push_data_opcode(function, data.len())?;
                opcode.header_size() + data.len()
            }
            Operation::Convert(_) | Operation::IsType(_) => 2,
            Operation::LoadSlot(kind, slot) | Operation::StoreSlot(kind, slot) => {
                if *slot <= 6 {
                    1
                } else if *slot <= u8::MAX as u32 {
                    2
                } else {
                    return Err(self.too_large(
                        function,
                        &format!("{} slot index", kind.name()),
                        *slot as u64,
                        u8::MAX as u64,
                    ));
                }
            }
            Operation::Jump(..) | Operation::EndTry(_) => branch(OpCode::Jmp, OpCode::JmpL),
            Operation::Try { .. } => branch(OpCode::Try, OpCode::TryL),
            Operation::Call(_) => branch(OpCode::Call, OpCode::CallL),
            Operation::CallToken(_) => OpCode::CallT.header_size(),
            Operation::SysCall(_) => OpCode::Syscall.header_size(),
            Operation::InitSlot { .. } => OpCode::InitSlot.header_size(),
            Operation::InitStaticSlot(_) => OpCode::InitSSlot.header_size(),
        };
        Ok(size)
    }

    fn push_int_opcode(&self, function: usize, value: &BigInt) -> Result<OpCode> {
        if let Some(opcode) = value.to_i64().and_then(OpCode::push_small) {
            return Ok(opcode);
        }
        let len = value.to_signed_bytes_le().len();
        INT_WIDTHS
            .iter()
            .find(|(width, _)| *width >= len)
            .map(|(_, opcode)| *opcode)
            .ok_or_else(|| self.too_large(function, "integer width in bytes", len as u64, 32))
    }

    /// Opcode and prefix width for a data push of `len` bytes.
    fn push_data_opcode(&self, function: usize, len: usize) -> Result<(OpCode, usize)> {
        if len <= u8::MAX as usize {
            Ok((OpCode::PushData1, 1))
        } else if len <= u16::MAX as usize {
            Ok((OpCode::PushData2, 2))
        } else if len <= u32::MAX as usize {
            Ok((OpCode::PushData4, 4))
        } else {
            Err(self.too_large(function, "push data length", len as u64, u32::MAX as u64))
        }
    }

    fn too_large(&self, function: usize, what: &str, size: u64, max: u64) -> EncodingError {
        EncodingError::OperandTooLarge {
            function: self.functions[function].name.clone(),
            what: what.to_string(),
            size,
            max,
            span: None,
        }
    }

    // ==========================================================================
    // Target resolution
    // ==========================================================================

    /// Absolute address an operation branches to, for single-target branches.
    fn resolve_label(&self, layout: &Layout, function: usize, label: Label) -> Result<usize> {
        layout.labels[function].get(&label).copied().ok_or_else(|| {
            EncodingError::InvalidTarget {
                function: self.functions[function].name.clone(),
                what: format!("branch to label {}", label.0),
                span: None,
            }
        })
    }

    fn resolve_call(&self, layout: &Layout, function: usize, callee: FunctionId) -> Result<usize> {
        layout
            .function_start(callee)
            .ok_or_else(|| EncodingError::InvalidTarget {
                function: self.functions[function].name.clone(),
                what: format!("call to function {}", callee.0),
                span: None,
            })
    }

    /// Relative offsets of every target of a branch operation.
    ///
    /// Absent try handlers yield `None` and encode as 0.
    fn branch_offsets(
        &self,
        layout: &Layout,
        function: usize,
        index: usize,
    ) -> Result<Vec<Option<i64>>> {
        let here = layout.addresses[function][index] as i64;
        let offset = |target: usize| Some(target as i64 - here);
        let offsets = match &self.functions[function].ops[index].operation {
            Operation::Jump(_, label) | Operation::EndTry(label) => {
                vec![offset(self.resolve_label(layout, function, *label)?)]
            }
            Operation::Call(callee) => vec![offset(self.resolve_call(layout, function, *callee)?)],
            Operation::Try { catch, finally } => {
                let mut offsets = Vec::with_capacity(2);
                for handler in [catch, finally] {
                    offsets.push(match handler {
                        Some(label) => offset(self.resolve_label(layout, function, *label)?),
                        None => None,
                    });
                }
                offsets
            }
            _ => Vec::new(),
        };
        Ok(offsets)
    }

    // ==========================================================================
    // Pass 2: encoding
    // ==========================================================================

    /// Lay out and encode every function, stopping at the first error.
    pub fn encode(&self) -> Result<EncodedScript> {
        let layout = self.layout()?;
        let mut script = Vec::with_capacity(layout.size);
        let mut methods = Vec::with_capacity(self.functions.len());
        for f in 0..self.functions.len() {
            methods.push(self.encode_function(&layout, f, &mut script)?);
        }
        Ok(EncodedScript { script, methods })
    }

    /// Like [`encode`](Self::encode), but every function is checked.
    ///
    /// Each failing function contributes its first error; the script is
    /// only returned when none failed.
    pub fn encode_each(&self) -> std::result::Result<EncodedScript, Vec<EncodingError>> {
        let mut errors = Vec::new();
        let (layout, laid_out) = self.layout_each(&mut errors);
        let mut script = Vec::with_capacity(layout.size);
        let mut methods = Vec::with_capacity(self.functions.len());

        for (f, ok) in laid_out.into_iter().enumerate() {
            if !ok {
                continue;
            }
            match self.encode_function(&layout, f, &mut script) {
                Ok(method) => methods.push(method),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(EncodedScript { script, methods })
        } else {
            Err(errors)
        }
    }

    /// Append one function's bytes to `out`.
    fn encode_function(
        &self,
        layout: &Layout,
        f: usize,
        out: &mut Vec<u8>,
    ) -> Result<EncodedMethod> {
        let function = &self.functions[f];
        let base = out.len();
        let mut sequence_points: Vec<(usize, Span)> = Vec::new();

        for (i, op) in function.ops.iter().enumerate() {
            let address = layout.addresses[f][i];
            debug_assert_eq!(
                address - layout.starts[f],
                out.len() - base,
                "layout drift in '{}'",
                function.name
            );

            if let Some(span) = op.location {
                match sequence_points.last_mut() {
                    Some(last) if last.0 == address => last.1 = span,
                    _ => sequence_points.push((address, span)),
                }
            }
            self.encode_op(layout, f, i, out)
                .map_err(|e| with_span(e, op.location))?;
        }

        Ok(EncodedMethod {
            id: function.id,
            name: function.name.clone(),
            start: layout.starts[f],
            end: layout.function_end(f),
            sequence_points,
        })
    }

    fn encode_op(
        &self,
        layout: &Layout,
        function: usize,
        index: usize,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let short = self.is_short(function, index);
        match &self.functions[function].ops[index].operation {
            Operation::Label(_) | Operation::Anchor => {}
            Operation::Simple(opcode) => {
                if !opcode.is_simple() {
                    return Err(EncodingError::InvalidOperand {
                        function: self.functions[function].name.clone(),
                        message: format!("{} needs an operand", opcode.name()),
                    });
                }
                out.push(*opcode as u8);
            }
            Operation::PushInt(value) => {
                let opcode = self.push_int_opcode(function, value)?;
                out.push(opcode as u8);
                let width = opcode.header_size() - 1;
                let mut bytes = value.to_signed_bytes_le();
                let fill = if value.sign() == Sign::Minus { 0xFF } else { 0x00 };
                bytes.resize(width, fill);
                out.extend_from_slice(&bytes);
            }
            Operation::PushData(data) => {
                let (opcode, prefix) = self.push_data_opcode(function, data.len())?;
                out.push(opcode as u8);
                out.extend_from_slice(&(data.len() as u32).to_le_bytes()[..prefix]);
                out.extend_from_slice(data);
            }
            Operation::PushBool(value) => {
                let opcode = if *value { OpCode::PushT } else { OpCode::PushF };
                out.push(opcode as u8);
            }
            Operation::PushNull => out.push(OpCode::PushNull as u8),
            Operation::Convert(ty) => {
                out.extend_from_slice(&[OpCode::Convert as u8, u8::from(*ty)]);
            }
            Operation::IsType(ty) => {
                out.extend_from_slice(&[OpCode::IsType as u8, u8::from(*ty)]);
            }
            Operation::LoadSlot(kind, slot) => {
                self.encode_slot(function, *kind, *slot, true, out)?;
            }
            Operation::StoreSlot(kind, slot) => {
                self.encode_slot(function, *kind, *slot, false, out)?;
            }
            Operation::Jump(kind, _) => {
                let offsets = self.branch_offsets(layout, function, index)?;
                let opcode = if short {
                    kind.long_opcode().short_form()
                } else {
                    kind.long_opcode()
                };
                write_branch(out, opcode, short, &offsets);
            }
            Operation::EndTry(_) => {
                let offsets = self.branch_offsets(layout, function, index)?;
                let opcode = if short { OpCode::EndTry } else { OpCode::EndTryL };
                write_branch(out, opcode, short, &offsets);
            }
            Operation::Call(_) => {
                let offsets = self.branch_offsets(layout, function, index)?;
                let opcode = if short { OpCode::Call } else { OpCode::CallL };
                write_branch(out, opcode, short, &offsets);
            }
            Operation::Try { .. } => {
                let offsets = self.branch_offsets(layout, function, index)?;
                let opcode = if short { OpCode::Try } else { OpCode::TryL };
                write_branch(out, opcode, short, &offsets);
            }
            Operation::CallToken(token) => {
                if self.tokens.get(*token).is_none() {
                    return Err(EncodingError::InvalidTarget {
                        function: self.functions[function].name.clone(),
                        what: format!("method token {token}"),
                        span: None,
                    });
                }
                out.push(OpCode::CallT as u8);
                out.extend_from_slice(&token.to_le_bytes());
            }
            Operation::SysCall(syscall) => {
                out.push(OpCode::Syscall as u8);
                out.extend_from_slice(&syscall.id().to_le_bytes());
            }
            Operation::InitSlot { locals, params } => {
                let locals = self.slot_count(function, "local count", *locals)?;
                let params = self.slot_count(function, "parameter count", *params)?;
                out.extend_from_slice(&[OpCode::InitSlot as u8, locals, params]);
            }
            Operation::InitStaticSlot(count) => {
                let count = self.slot_count(function, "static count", *count)?;
                out.extend_from_slice(&[OpCode::InitSSlot as u8, count]);
            }
            Operation::Return => out.push(OpCode::Ret as u8),
        }
        Ok(())
    }

    fn slot_count(&self, function: usize, what: &str, count: u32) -> Result<u8> {
        u8::try_from(count)
            .map_err(|_| self.too_large(function, what, count as u64, u8::MAX as u64))
    }

    /// Slot access: compact opcode for 0-6, explicit u8 operand for 7-255.
    fn encode_slot(
        &self,
        function: usize,
        kind: SlotKind,
        slot: u32,
        load: bool,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let (compact, explicit) = match (kind, load) {
            (SlotKind::Argument, true) => (OpCode::LdArg0, OpCode::LdArg),
            (SlotKind::Argument, false) => (OpCode::StArg0, OpCode::StArg),
            (SlotKind::Local, true) => (OpCode::LdLoc0, OpCode::LdLoc),
            (SlotKind::Local, false) => (OpCode::StLoc0, OpCode::StLoc),
            (SlotKind::Static, true) => (OpCode::LdSFld0, OpCode::LdSFld),
            (SlotKind::Static, false) => (OpCode::StSFld0, OpCode::StSFld),
        };

        if slot <= 6 {
            let opcode = OpCode::from_u8(compact as u8 + slot as u8).ok_or_else(|| {
                EncodingError::InvalidOperand {
                    function: self.functions[function].name.clone(),
                    message: format!("no compact form of {} for slot {slot}", explicit.name()),
                }
            })?;
            out.push(opcode as u8);
        } else {
            let what = format!("{} slot index", kind.name());
            let index = u8::try_from(slot)
                .map_err(|_| self.too_large(function, &what, slot as u64, u8::MAX as u64))?;
            out.extend_from_slice(&[explicit as u8, index]);
        }
        Ok(())
    }
}

/// Write a branch opcode and its offsets; absent targets encode as 0.
fn write_branch(out: &mut Vec<u8>, opcode: OpCode, short: bool, offsets: &[Option<i64>]) {
    out.push(opcode as u8);
    for offset in offsets {
        let offset = offset.unwrap_or(0);
        if short {
            out.push(offset as i8 as u8);
        } else {
            out.extend_from_slice(&(offset as i32).to_le_bytes());
        }
    }
}

/// Attach the operation's location to errors raised without one.
fn with_span(error: EncodingError, location: Option<Span>) -> EncodingError {
    match error {
        EncodingError::OperandTooLarge {
            function,
            what,
            size,
            max,
            span: None,
        } => EncodingError::OperandTooLarge {
            function,
            what,
            size,
            max,
            span: location,
        },
        EncodingError::InvalidTarget {
            function,
            what,
            span: None,
        } => EncodingError::InvalidTarget {
            function,
            what,
            span: location,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ContractParamType;
    use crate::builtins::Syscall;
    use crate::bytecode::{Instruction, assert_opcodes, decode};
    use crate::ir::{FunctionBuilder, JumpKind, Op};
    use contractc_core::FileId;

    fn function(id: u32, name: &str, ops: Vec<Operation>) -> FunctionIr {
        FunctionIr {
            id: FunctionId(id),
            name: name.to_string(),
            ops: ops.into_iter().map(Op::new).collect(),
            params: Vec::new(),
            locals: Vec::new(),
            return_type: ContractParamType::Void,
            is_export: true,
            is_safe: false,
        }
    }

    fn encode(functions: &[FunctionIr]) -> Result<EncodedScript> {
        let tokens = TokenTable::new();
        Encoder::new(functions, &tokens).encode()
    }

    fn push_int(value: i64) -> Vec<u8> {
        let f = function(0, "f", vec![Operation::PushInt(BigInt::from(value))]);
        encode(&[f]).unwrap().script
    }

    #[test]
    fn compact_integer_pushes() {
        for value in -1..=16 {
            let script = push_int(value);
            assert_eq!(script.len(), 1, "value {value}");
            let decoded = Instruction::decode(&script, 0).unwrap();
            assert_eq!(decoded.push_int(), Some(BigInt::from(value)));
        }
    }

    #[test]
    fn integer_widths() {
        let cases: [(i64, OpCode); 8] = [
            (17, OpCode::PushInt8),
            (-2, OpCode::PushInt8),
            (127, OpCode::PushInt8),
            (128, OpCode::PushInt16),
            (-129, OpCode::PushInt16),
            (40_000, OpCode::PushInt32),
            (i64::from(i32::MIN), OpCode::PushInt32),
            (i64::MAX, OpCode::PushInt64),
        ];
        for (value, opcode) in cases {
            let script = push_int(value);
            let decoded = Instruction::decode(&script, 0).unwrap();
            assert_eq!(decoded.opcode, opcode, "value {value}");
            assert_eq!(decoded.push_int(), Some(BigInt::from(value)));
        }

        let big = BigInt::from(1) << 200u32;
        let f = function(0, "f", vec![Operation::PushInt(big.clone())]);
        let script = encode(&[f]).unwrap().script;
        assert_eq!(script[0], OpCode::PushInt256 as u8);
        assert_eq!(Instruction::decode(&script, 0).unwrap().push_int(), Some(big));

        let too_big = BigInt::from(1) << 256u32;
        let f = function(0, "f", vec![Operation::PushInt(too_big)]);
        assert!(matches!(encode(&[f]), Err(EncodingError::OperandTooLarge { .. })));
    }

    #[test]
    fn data_push_prefixes() {
        let f = function(
            0,
            "f",
            vec![
                Operation::PushData(b"TOKEN".to_vec()),
                Operation::PushData(vec![7; 300]),
            ],
        );
        let script = encode(&[f]).unwrap().script;
        assert_eq!(&script[..7], &[OpCode::PushData1 as u8, 5, b'T', b'O', b'K', b'E', b'N']);
        assert_eq!(&script[7..10], &[OpCode::PushData2 as u8, 0x2C, 0x01]);
        assert_eq!(script.len(), 7 + 3 + 300);
    }

    #[test]
    fn slot_packing() {
        let f = function(
            0,
            "f",
            vec![
                Operation::LoadSlot(SlotKind::Argument, 6),
                Operation::LoadSlot(SlotKind::Argument, 7),
                Operation::StoreSlot(SlotKind::Local, 0),
                Operation::StoreSlot(SlotKind::Static, 255),
            ],
        );
        let script = encode(&[f]).unwrap().script;
        assert_eq!(
            script,
            vec![
                OpCode::LdArg0 as u8 + 6,
                OpCode::LdArg as u8,
                7,
                OpCode::StLoc0 as u8,
                OpCode::StSFld as u8,
                255,
            ]
        );

        let f = function(0, "f", vec![Operation::LoadSlot(SlotKind::Local, 256)]);
        assert!(matches!(encode(&[f]), Err(EncodingError::OperandTooLarge { .. })));
    }

    #[test]
    fn long_jump_offsets_are_relative() {
        let mut builder = FunctionBuilder::new(FunctionId(0), "f");
        let skip = builder.new_label();
        builder.emit(Operation::PushBool(true));
        builder.emit_jump(JumpKind::IfFalse, skip);
        builder.emit_op(OpCode::Nop);
        builder.place_label(skip);
        let ir = builder.finish().unwrap();

        let script = encode(&[ir]).unwrap().script;
        assert_opcodes(&script, &[OpCode::PushT, OpCode::JmpIfNotL, OpCode::Nop, OpCode::Ret]);
        let jump = Instruction::decode(&script, 1).unwrap();
        assert_eq!(jump.branch_targets(), vec![7]);
    }

    #[test]
    fn calls_resolve_callee_entry() {
        let main = function(0, "main", vec![Operation::Call(FunctionId(1)), Operation::Return]);
        let helper = function(1, "helper", vec![Operation::Return]);
        let encoded = encode(&[main, helper]).unwrap();

        assert_eq!(encoded.methods[1].start, 6);
        assert_eq!(encoded.methods[0].end, 6);
        let call = Instruction::decode(&encoded.script, 0).unwrap();
        assert_eq!(call.opcode, OpCode::CallL);
        assert_eq!(call.branch_targets(), vec![6]);
    }

    #[test]
    fn dangling_references_are_invalid_targets() {
        let f = function(0, "f", vec![Operation::Jump(JumpKind::Always, Label(9))]);
        assert!(matches!(encode(&[f]), Err(EncodingError::InvalidTarget { .. })));

        let f = function(0, "f", vec![Operation::Call(FunctionId(4))]);
        assert!(matches!(encode(&[f]), Err(EncodingError::InvalidTarget { .. })));

        let f = function(0, "f", vec![Operation::CallToken(0)]);
        assert!(matches!(encode(&[f]), Err(EncodingError::InvalidTarget { .. })));
    }

    #[test]
    fn syscall_and_slot_headers() {
        let f = function(
            0,
            "f",
            vec![
                Operation::InitSlot { locals: 2, params: 1 },
                Operation::SysCall(Syscall::RuntimeGetTime),
            ],
        );
        let script = encode(&[f]).unwrap().script;
        assert_eq!(&script[..3], &[OpCode::InitSlot as u8, 2, 1]);
        assert_eq!(script[3], OpCode::Syscall as u8);
        assert_eq!(&script[4..8], &Syscall::RuntimeGetTime.id().to_le_bytes());
        assert_eq!(decode(&script).unwrap().len(), 2);
    }

    #[test]
    fn later_location_wins_at_same_address() {
        let outer = Span::new(FileId(0), 1, 1, 1, 2);
        let inner = Span::new(FileId(0), 2, 5, 2, 20);
        let mut f = function(
            0,
            "f",
            vec![Operation::Anchor, Operation::PushNull, Operation::Return],
        );
        f.ops[0].location = Some(outer);
        f.ops[1].location = Some(inner);
        f.ops[2].location = Some(outer);

        let encoded = encode(&[f]).unwrap();
        assert_eq!(encoded.methods[0].sequence_points, vec![(0, inner), (1, outer)]);
    }

    #[test]
    fn each_failing_function_reports_once() {
        let functions = [
            function(
                0,
                "wide",
                vec![
                    Operation::PushInt(BigInt::from(1) << 300u32),
                    Operation::PushInt(BigInt::from(1) << 400u32),
                ],
            ),
            function(1, "lost", vec![Operation::Jump(JumpKind::Always, Label(9))]),
            function(2, "fine", vec![Operation::Return]),
        ];
        let tokens = TokenTable::new();

        let errors = Encoder::new(&functions, &tokens).encode_each().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            EncodingError::OperandTooLarge { ref function, .. } if function == "wide"
        ));
        assert!(matches!(
            errors[1],
            EncodingError::InvalidTarget { ref function, .. } if function == "lost"
        ));

        let encoded = Encoder::new(&functions[2..], &tokens).encode_each().unwrap();
        assert_eq!(encoded.script, vec![OpCode::Ret as u8]);
    }
}
