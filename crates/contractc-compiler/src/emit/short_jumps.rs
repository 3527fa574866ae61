//! Optional short-branch pass.
//!
//! Runs strictly after the long-form baseline is known to lay out. Each round
//! lays the script out with the current choices and switches every remaining
//! long branch whose offsets fit an `i8` to its 1-byte form. Sizes only
//! shrink, so an offset never grows once measured: every decision stays
//! valid and the iteration reaches a fixed point.

use tracing::trace;

use super::{Encoder, Result};

impl Encoder<'_> {
    /// Shorten branches to a fixed point; returns how many were shortened.
    pub fn shorten_jumps(&mut self) -> Result<usize> {
        let mut round = 0;
        loop {
            let layout = self.layout()?;
            let mut changed = 0;

            for f in 0..self.functions.len() {
                for i in 0..self.functions[f].ops.len() {
                    if self.is_short(f, i) {
                        continue;
                    }
                    let offsets = self.branch_offsets(&layout, f, i)?;
                    let fits = !offsets.is_empty()
                        && offsets
                            .iter()
                            .flatten()
                            .all(|offset| i8::try_from(*offset).is_ok());
                    if fits {
                        self.short[f].insert(i);
                        changed += 1;
                    }
                }
            }

            round += 1;
            trace!(round, changed, size = layout.size(), "short-branch round");
            if changed == 0 {
                return Ok(self.short_count());
            }
        }
    }
}
