//! Catch recovery pass.
//!
//! Tcl compiles `catch { body }` into a span opened by `beginCatch4` and closed by
//! `endCatch`. The normal path jumps over the error handler with a single unconditional
//! branch:
//!
//! ```text
//! beginCatch4 0      <- span start
//!   body commands
//!   push1 "0"        <- result placeholder, dropped
//!   jump1 +N
//!   pushReturnCode
//! endCatch           <- span end
//! ```
//!
//! Only one of the two paths runs, so the recovered command takes the stack effect of the
//! normal path rather than the sum over the whole span.
//!
//! Overlapping and nested markers are stitched into maximal spans first. Spans are rewritten
//! from the last one backwards, so earlier rewrites never move a later span.

use std::collections::{BTreeSet, HashSet};

use crate::{
    code::{CodeMap, CodeRange, CodeUnit},
    compiler::{passes::ExpressionFolding, pass::ReductionPass, DecompilerContext, EventKind},
    disassembler::Opcode,
    expr::Expr,
    Result,
};

use super::statement;

/// Turns `beginCatch4` / `endCatch` spans into `catch` commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchRecovery {
    folding: ExpressionFolding,
}

impl CatchRecovery {
    /// Creates the pass. `folding` is re-run after every rewrite.
    #[must_use]
    pub fn new(folding: ExpressionFolding) -> Self {
        Self { folding }
    }

    /// Maximal spans covered by at least one open catch, in ascending order.
    ///
    /// A location that ends one span and starts the next keeps the span open.
    fn stitched_spans(map: &CodeMap) -> Vec<CodeRange> {
        let mut starts = HashSet::new();
        let mut ends = HashSet::new();

        for unit in map.units() {
            let Some(instruction) = unit.as_instruction() else {
                continue;
            };
            match instruction.opcode {
                Opcode::BeginCatch4 => {
                    starts.insert(instruction.location);
                }
                Opcode::EndCatch => {
                    ends.insert(instruction.end());
                }
                _ => {}
            }
        }

        let boundaries: BTreeSet<u32> = starts.iter().chain(ends.iter()).copied().collect();
        let mut spans = Vec::new();
        let mut open = 0usize;
        let mut start = 0;

        for location in boundaries {
            if starts.contains(&location) {
                if open == 0 {
                    start = location;
                }
                open += 1;
            }
            if ends.contains(&location) && open > 0 {
                open -= 1;
                if open == 0 {
                    spans.push(CodeRange::new(start, location - start));
                }
            }
        }

        spans
    }

    /// Rewrites a single span. Returns `false` if the span does not have the expected shape.
    fn recover(map: &mut CodeMap, span: CodeRange) -> Result<bool> {
        let units = map.code_in_range(span);
        let (Some(first), Some(last)) = (units.first(), units.last()) else {
            return Ok(false);
        };
        if first.location() != span.start || last.end() != span.end() {
            return Ok(false);
        }

        let jumps: Vec<u32> = units
            .iter()
            .filter_map(|unit| unit.as_instruction())
            .filter(|instruction| instruction.opcode.is_unconditional_branch())
            .map(|instruction| instruction.location)
            .collect();
        let &[jump] = jumps.as_slice() else {
            return Ok(false);
        };
        if jump < first.end() {
            return Ok(false);
        }

        // Everything up to the jump, then straight to endCatch
        let stack_effect: i32 = units
            .iter()
            .filter(|unit| unit.location() <= jump || unit.end() == span.end())
            .map(|unit| unit.stack_effect())
            .sum();

        let mut body: Vec<&CodeUnit> =
            map.code_in_range(CodeRange::new(first.end(), jump - first.end()));
        if body
            .last()
            .and_then(|unit| unit.as_command())
            .is_some_and(|command| command.expr().as_literal() == Some("0"))
        {
            body.pop();
        }

        let statements: Vec<Expr> = body.into_iter().map(statement).collect();
        map.merge_with_effect(span, stack_effect, move |_| Ok(Expr::catch(statements)))?;
        Ok(true)
    }
}

impl ReductionPass for CatchRecovery {
    fn name(&self) -> &'static str {
        "catch-recovery"
    }

    fn description(&self) -> &'static str {
        "Recover catch commands from beginCatch4 / endCatch spans"
    }

    fn run(&self, map: &mut CodeMap, ctx: &DecompilerContext) -> Result<bool> {
        let mut changed = false;

        for span in Self::stitched_spans(map).into_iter().rev() {
            if !Self::recover(map, span)? {
                log::trace!("catch span {} does not match, skipped", span);
                continue;
            }

            changed = true;
            ctx.events
                .record(EventKind::CatchRecovered)
                .at(span.start)
                .pass(self.name())
                .message(format!("{} bytes", span.length));
            self.folding.fold_to_fixpoint(map, ctx)?;
        }

        Ok(changed)
    }
}
