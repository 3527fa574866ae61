//! Encoding Pass - lay out and encode the frozen IR.
//!
//! Always encodes the long-form baseline first; with `optimize` set, the
//! short-branch pass then runs to a fixed point. Either way the script is
//! re-decoded by [`verify`] before it is handed on.

use contractc_core::EncodingError;
use tracing::debug;

use crate::context::CompilationContext;
use crate::emit::{EncodedScript, Encoder, verify};
use crate::ir::FunctionIr;

/// Pass 3: produce the contract script.
pub struct EncodingPass<'a> {
    ctx: &'a mut CompilationContext,
    optimize: bool,
}

impl<'a> EncodingPass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self {
            ctx,
            optimize: false,
        }
    }

    /// Shorten branches whose offsets fit one byte.
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Encode every function; `None` after reporting the errors.
    ///
    /// Each function is checked independently, so one diagnostic is
    /// reported per failing function.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self, functions: &[FunctionIr]) -> Option<EncodedScript> {
        match encode(functions, self.ctx, self.optimize) {
            Ok(encoded) => Some(encoded),
            Err(errors) => {
                debug!(errors = errors.len(), "encoding failed");
                for error in errors {
                    self.ctx.add_error(error);
                }
                None
            }
        }
    }
}

fn encode(
    functions: &[FunctionIr],
    ctx: &CompilationContext,
    optimize: bool,
) -> Result<EncodedScript, Vec<EncodingError>> {
    let tokens = ctx.tokens();
    let mut encoder = Encoder::new(functions, tokens);
    let mut encoded = encoder.encode_each()?;
    let baseline = encoded.script.len();

    if optimize {
        let shortened = encoder.shorten_jumps().map_err(|e| vec![e])?;
        debug!(shortened, "short branches applied");
        encoded = encoder.encode().map_err(|e| vec![e])?;
    }

    verify::verify(&encoded, tokens.len()).map_err(|e| vec![e])?;

    debug!(
        methods = encoded.methods.len(),
        size = encoded.script.len(),
        baseline,
        "script encoded"
    );
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ContractParamType;
    use crate::bytecode::OpCode;
    use crate::ir::{FunctionId, JumpKind, Label, Op, Operation};

    fn looping() -> FunctionIr {
        FunctionIr {
            id: FunctionId(0),
            name: "spin".into(),
            ops: vec![
                Op::new(Operation::Label(Label(1))),
                Op::new(Operation::PushBool(true)),
                Op::new(Operation::Jump(JumpKind::IfFalse, Label(2))),
                Op::new(Operation::Simple(OpCode::Nop)),
                Op::new(Operation::Jump(JumpKind::Always, Label(1))),
                Op::new(Operation::Label(Label(2))),
                Op::new(Operation::Return),
            ],
            params: Vec::new(),
            locals: Vec::new(),
            return_type: ContractParamType::Void,
            is_export: true,
            is_safe: false,
        }
    }

    #[test]
    fn optimize_never_grows_the_script() {
        let functions = [looping()];

        let mut ctx = CompilationContext::new();
        let long = EncodingPass::new(&mut ctx).run(&functions).unwrap();
        let short = EncodingPass::new(&mut ctx)
            .with_optimize(true)
            .run(&functions)
            .unwrap();

        assert!(!ctx.has_errors());
        assert_eq!(long.script.len(), 13);
        assert_eq!(short.script.len(), 7);
        assert_eq!(short.script[1], OpCode::JmpIfNot as u8);
    }

    #[test]
    fn encoding_errors_are_reported() {
        let mut function = looping();
        function.ops.push(Op::new(Operation::CallToken(0)));

        let mut ctx = CompilationContext::new();
        assert!(EncodingPass::new(&mut ctx).run(&[function]).is_none());
        assert!(matches!(
            ctx.errors()[0],
            contractc_core::CompilationError::Encoding(EncodingError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn every_failing_function_is_reported() {
        let mut first = looping();
        first.ops.insert(0, Op::new(Operation::CallToken(3)));
        let mut second = looping();
        second.id = FunctionId(1);
        second.name = "spin2".into();
        second.ops.insert(0, Op::new(Operation::CallToken(4)));

        let mut ctx = CompilationContext::new();
        assert!(EncodingPass::new(&mut ctx).run(&[first, second]).is_none());

        let errors = ctx.take_errors().into_vec();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(
            e,
            contractc_core::CompilationError::Encoding(EncodingError::InvalidTarget { .. })
        )));
    }
}
