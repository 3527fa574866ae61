//! Per-function IR builder.
//!
//! The [`FunctionBuilder`] owns the operation list of one function while it
//! is lowered. It hands out labels and slot indices, tracks loops and try
//! regions, and freezes everything into a [`FunctionIr`] on
//! [`finish`](FunctionBuilder::finish).
//!
//! Every `return` jumps to a single return target placed by `finish`, so a
//! function always has exactly one `RET`.

use contractc_core::{EncodingError, Span};
use num_bigint::BigInt;
use rustc_hash::FxHashSet;

use super::jumps::{BreakError, JumpManager, LoopExit, TryPhase};
use super::{FunctionId, JumpKind, Label, Op, OpHandle, Operation, SlotKind};
use crate::artifacts::ContractParamType;
use crate::bytecode::OpCode;

/// A named, typed slot (parameter or local).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub name: String,
    pub ty: ContractParamType,
}

/// A frozen function, ready for encoding.
#[derive(Debug, Clone)]
pub struct FunctionIr {
    pub id: FunctionId,
    pub name: String,
    pub ops: Vec<Op>,
    pub params: Vec<SlotInfo>,
    pub locals: Vec<SlotInfo>,
    pub return_type: ContractParamType,
    /// Listed in the ABI.
    pub is_export: bool,
    pub is_safe: bool,
}

/// Builds the operation list of one function.
pub struct FunctionBuilder {
    id: FunctionId,
    name: String,
    ops: Vec<Op>,
    params: Vec<SlotInfo>,
    locals: Vec<SlotInfo>,
    /// Placement flag per label.
    labels: Vec<bool>,
    return_target: Label,
    jumps: JumpManager,
}

impl FunctionBuilder {
    pub fn new(id: FunctionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ops: Vec::new(),
            params: Vec::new(),
            locals: Vec::new(),
            // label 0 is the return target
            labels: vec![false],
            return_target: Label(0),
            jumps: JumpManager::new(),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operations emitted so far.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Number of operations emitted so far.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    // ==========================================================================
    // Slots
    // ==========================================================================

    /// Declare the next parameter; returns its argument index.
    pub fn add_param(&mut self, name: impl Into<String>, ty: ContractParamType) -> u32 {
        self.params.push(SlotInfo {
            name: name.into(),
            ty,
        });
        (self.params.len() - 1) as u32
    }

    /// Allocate a new local slot; returns its index.
    ///
    /// Slots are never reused, even after the declaring block ends.
    pub fn add_local(&mut self, name: impl Into<String>, ty: ContractParamType) -> u32 {
        self.locals.push(SlotInfo {
            name: name.into(),
            ty,
        });
        (self.locals.len() - 1) as u32
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Append an operation.
    pub fn emit(&mut self, operation: Operation) -> OpHandle {
        self.ops.push(Op::new(operation));
        OpHandle(self.ops.len() - 1)
    }

    /// Append an opcode without operand.
    pub fn emit_op(&mut self, opcode: OpCode) -> OpHandle {
        self.emit(Operation::Simple(opcode))
    }

    pub fn emit_push_int(&mut self, value: impl Into<BigInt>) -> OpHandle {
        self.emit(Operation::PushInt(value.into()))
    }

    pub fn emit_push_data(&mut self, data: impl Into<Vec<u8>>) -> OpHandle {
        self.emit(Operation::PushData(data.into()))
    }

    pub fn emit_load(&mut self, kind: SlotKind, index: u32) -> OpHandle {
        self.emit(Operation::LoadSlot(kind, index))
    }

    pub fn emit_store(&mut self, kind: SlotKind, index: u32) -> OpHandle {
        self.emit(Operation::StoreSlot(kind, index))
    }

    /// Emit a zero-size marker carrying a source location.
    pub fn emit_anchor(&mut self, span: Span) -> OpHandle {
        let handle = self.emit(Operation::Anchor);
        self.set_location(handle, span);
        handle
    }

    /// Attach a source location to an emitted operation.
    pub fn set_location(&mut self, handle: OpHandle, span: Span) {
        if let Some(op) = self.ops.get_mut(handle.0) {
            op.location = Some(span);
        }
    }

    /// Attribute the operations emitted since `start` to a statement.
    ///
    /// The location goes on the first of them, unless it already has one.
    pub fn mark_statement(&mut self, start: usize, span: Span) {
        if let Some(op) = self.ops.get_mut(start)
            && op.location.is_none()
        {
            op.location = Some(span);
        }
    }

    // ==========================================================================
    // Labels and jumps
    // ==========================================================================

    pub fn new_label(&mut self) -> Label {
        self.labels.push(false);
        Label((self.labels.len() - 1) as u32)
    }

    /// Place a label at the current position.
    pub fn place_label(&mut self, label: Label) {
        debug_assert!(
            !self.labels[label.0 as usize],
            "label {} placed twice",
            label.0
        );
        self.labels[label.0 as usize] = true;
        self.emit(Operation::Label(label));
    }

    pub fn emit_jump(&mut self, kind: JumpKind, label: Label) -> OpHandle {
        self.emit(Operation::Jump(kind, label))
    }

    /// The label every `return` transfers to.
    pub fn return_target(&self) -> Label {
        self.return_target
    }

    /// Emit the transfer described by a [`LoopExit`].
    pub fn emit_exit(&mut self, exit: LoopExit) -> OpHandle {
        match exit {
            LoopExit::Jump(label) => self.emit_jump(JumpKind::Always, label),
            LoopExit::EndTry(label) => self.emit(Operation::EndTry(label)),
        }
    }

    pub fn enter_loop(&mut self, continue_label: Label, break_label: Label) {
        self.jumps.enter_loop(continue_label, break_label);
    }

    pub fn exit_loop(&mut self) {
        self.jumps.exit_loop();
    }

    pub fn break_exit(&self) -> Result<LoopExit, BreakError> {
        self.jumps.break_exit()
    }

    pub fn continue_exit(&self) -> Result<LoopExit, BreakError> {
        self.jumps.continue_exit()
    }

    pub fn return_exit(&self) -> Result<LoopExit, BreakError> {
        self.jumps.return_exit(self.return_target)
    }

    pub fn enter_try(&mut self) {
        self.jumps.enter_try();
    }

    pub fn set_try_phase(&mut self, phase: TryPhase) {
        self.jumps.set_try_phase(phase);
    }

    pub fn exit_try(&mut self) {
        self.jumps.exit_try();
    }

    // ==========================================================================
    // Finish
    // ==========================================================================

    /// Freeze the function.
    ///
    /// Places the return target and `RET`, drops unconditional jumps that
    /// would only skip zero-size markers, prepends `INITSLOT` when the
    /// function has parameters or locals, and checks that every referenced
    /// label was placed.
    pub fn finish(mut self) -> Result<FunctionIr, EncodingError> {
        let return_target = self.return_target;
        self.place_label(return_target);
        self.emit(Operation::Return);

        let mut ops = elide_fallthrough_jumps(self.ops);

        if !self.params.is_empty() || !self.locals.is_empty() {
            ops.insert(
                0,
                Op::new(Operation::InitSlot {
                    locals: self.locals.len() as u32,
                    params: self.params.len() as u32,
                }),
            );
        }

        let placed: FxHashSet<Label> = ops
            .iter()
            .filter_map(|op| match op.operation {
                Operation::Label(label) => Some(label),
                _ => None,
            })
            .collect();
        for op in &ops {
            if let Some(missing) = op.operation.targets().find(|l| !placed.contains(l)) {
                return Err(EncodingError::InvalidTarget {
                    function: self.name,
                    what: format!("branch to label {}", missing.0),
                    span: op.location,
                });
            }
        }

        Ok(FunctionIr {
            id: self.id,
            name: self.name,
            ops,
            params: self.params,
            locals: self.locals,
            return_type: ContractParamType::Void,
            is_export: false,
            is_safe: false,
        })
    }
}

/// Remove `JMP label` when only zero-size markers separate it from `label`.
fn elide_fallthrough_jumps(ops: Vec<Op>) -> Vec<Op> {
    let redundant: Vec<bool> = (0..ops.len())
        .map(|i| match ops[i].operation {
            Operation::Jump(JumpKind::Always, target) => ops[i + 1..]
                .iter()
                .take_while(|op| op.operation.is_marker())
                .any(|op| op.operation == Operation::Label(target)),
            _ => false,
        })
        .collect();

    ops.into_iter()
        .zip(redundant)
        .filter_map(|(op, skip)| (!skip).then_some(op))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractc_core::FileId;

    fn span(line: u32) -> Span {
        Span::new(FileId(0), line, 1, line, 5)
    }

    fn operations(ir: &FunctionIr) -> Vec<Operation> {
        ir.ops.iter().map(|op| op.operation.clone()).collect()
    }

    #[test]
    fn return_jump_before_target_is_elided() {
        let mut builder = FunctionBuilder::new(FunctionId(0), "decimals");
        builder.emit_push_int(8);
        let exit = builder.return_exit().unwrap();
        builder.emit_exit(exit);

        let ir = builder.finish().unwrap();
        assert_eq!(
            operations(&ir),
            vec![
                Operation::PushInt(BigInt::from(8)),
                Operation::Label(Label(0)),
                Operation::Return,
            ]
        );
    }

    #[test]
    fn jump_over_code_is_kept() {
        let mut builder = FunctionBuilder::new(FunctionId(0), "f");
        let end = builder.new_label();
        builder.emit_jump(JumpKind::Always, end);
        builder.emit_op(OpCode::Nop);
        builder.place_label(end);

        let ir = builder.finish().unwrap();
        assert!(matches!(
            ir.ops[0].operation,
            Operation::Jump(JumpKind::Always, _)
        ));
    }

    #[test]
    fn init_slot_only_with_slots() {
        let builder = FunctionBuilder::new(FunctionId(0), "empty");
        let ir = builder.finish().unwrap();
        assert_eq!(ir.ops.last().map(|op| &op.operation), Some(&Operation::Return));
        assert!(!matches!(ir.ops[0].operation, Operation::InitSlot { .. }));

        let mut builder = FunctionBuilder::new(FunctionId(0), "withParam");
        builder.add_param("a", ContractParamType::Integer);
        builder.add_local("b", ContractParamType::Integer);
        builder.add_local("c", ContractParamType::Integer);
        let ir = builder.finish().unwrap();
        assert_eq!(
            ir.ops[0].operation,
            Operation::InitSlot {
                locals: 2,
                params: 1
            }
        );
    }

    #[test]
    fn unplaced_label_is_invalid_target() {
        let mut builder = FunctionBuilder::new(FunctionId(0), "broken");
        let nowhere = builder.new_label();
        let handle = builder.emit_jump(JumpKind::IfFalse, nowhere);
        builder.set_location(handle, span(3));

        let err = builder.finish().unwrap_err();
        assert!(matches!(
            err,
            EncodingError::InvalidTarget { ref function, span: Some(_), .. } if function == "broken"
        ));
    }

    #[test]
    fn statement_location_goes_on_first_op() {
        let mut builder = FunctionBuilder::new(FunctionId(0), "f");
        let start = builder.len();
        builder.emit_push_int(1);
        builder.emit_op(OpCode::Drop);
        builder.mark_statement(start, span(7));

        assert_eq!(builder.ops()[0].location, Some(span(7)));
        assert_eq!(builder.ops()[1].location, None);

        // an existing location is kept
        let start = builder.len();
        builder.emit_anchor(span(8));
        builder.mark_statement(start, span(9));
        assert_eq!(builder.ops()[2].location, Some(span(8)));
    }

    #[test]
    fn locals_are_not_reused() {
        let mut builder = FunctionBuilder::new(FunctionId(0), "f");
        assert_eq!(builder.add_local("a", ContractParamType::Any), 0);
        assert_eq!(builder.add_local("a", ContractParamType::Any), 1);
        assert_eq!(builder.local_count(), 2);
    }
}
