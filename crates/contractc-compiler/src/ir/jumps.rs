//! Jump management for structured control flow.
//!
//! Tracks the loop stack for `break`/`continue` and the try-region stack so
//! that leaving a protected region goes through `ENDTRY` instead of a plain
//! jump.

use super::Label;

/// Which part of a try statement is being lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPhase {
    Body,
    Catch,
    Finally,
}

/// How to transfer control to a label outside the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Same try depth: plain jump.
    Jump(Label),
    /// One protected region to leave: `ENDTRY` to the label.
    EndTry(Label),
}

/// Why a control transfer cannot be lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakError {
    /// `break`/`continue` outside of any loop.
    NotInLoop,
    /// The transfer leaves a `finally` block or more than one try region.
    AcrossTry,
}

/// Context for a single loop.
#[derive(Debug)]
struct LoopContext {
    continue_label: Label,
    break_label: Label,
    /// Try depth when the loop was entered.
    try_depth: usize,
}

/// Manages jump targets for control flow.
#[derive(Debug, Default)]
pub(crate) struct JumpManager {
    /// Stack of loop contexts (innermost last)
    loops: Vec<LoopContext>,
    /// Stack of enclosing try regions (innermost last)
    tries: Vec<TryPhase>,
}

impl JumpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, continue_label: Label, break_label: Label) {
        self.loops.push(LoopContext {
            continue_label,
            break_label,
            try_depth: self.tries.len(),
        });
    }

    pub fn exit_loop(&mut self) {
        self.loops.pop();
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }

    pub fn enter_try(&mut self) {
        self.tries.push(TryPhase::Body);
    }

    /// Move the innermost try region to its catch or finally block.
    pub fn set_try_phase(&mut self, phase: TryPhase) {
        if let Some(current) = self.tries.last_mut() {
            *current = phase;
        }
    }

    pub fn exit_try(&mut self) {
        self.tries.pop();
    }

    pub fn try_depth(&self) -> usize {
        self.tries.len()
    }

    pub fn break_exit(&self) -> Result<LoopExit, BreakError> {
        let ctx = self.loops.last().ok_or(BreakError::NotInLoop)?;
        self.exit_to(ctx.break_label, ctx.try_depth)
    }

    pub fn continue_exit(&self) -> Result<LoopExit, BreakError> {
        let ctx = self.loops.last().ok_or(BreakError::NotInLoop)?;
        self.exit_to(ctx.continue_label, ctx.try_depth)
    }

    /// Exit for a `return`, whose target sits outside every try region.
    pub fn return_exit(&self, target: Label) -> Result<LoopExit, BreakError> {
        self.exit_to(target, 0)
    }

    fn exit_to(&self, target: Label, depth: usize) -> Result<LoopExit, BreakError> {
        match self.tries.len() - depth {
            0 => Ok(LoopExit::Jump(target)),
            1 if self.tries.last() != Some(&TryPhase::Finally) => Ok(LoopExit::EndTry(target)),
            _ => Err(BreakError::AcrossTry),
        }
    }
}
