//! Short-circuit and ternary recovery pass.
//!
//! `&&`, `||` and `?:` inside expressions compile to a fixed branch shape following the test
//! operand:
//!
//! ```text
//! <anchor>            test operand, already a command
//! A: jumpFalse ...    conditional
//!    ...
//! B: jump X           unconditional
//!    ...
//! C: jumpTrue ...     conditional
//!    ...
//! X: <unit>           single outgoing edge to C's end
//! ```
//!
//! The incoming edge of A must be unique, and its source is the anchor.
//!
//! On a match everything from the anchor's end up to C's end is absorbed into the anchor, so
//! the operator that consumes the combined value can fold again.

use crate::{
    code::{CodeMap, CodeRange, CodeUnit},
    compiler::{pass::ReductionPass, passes::ExpressionFolding, DecompilerContext, EventKind},
    disassembler::Instruction,
    Result,
};

/// Absorbs conditional / unconditional / conditional branch triples into their test command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortCircuitRecovery {
    folding: ExpressionFolding,
}

/// A matched triple, ready to be absorbed.
struct Candidate {
    anchor: CodeRange,
    end: u32,
}

impl ShortCircuitRecovery {
    /// Creates the pass. `folding` is re-run after every rewrite.
    #[must_use]
    pub fn new(folding: ExpressionFolding) -> Self {
        Self { folding }
    }

    /// Locations of the top-level branch instructions, ascending.
    fn branches(map: &CodeMap) -> Vec<u32> {
        map.units()
            .filter_map(CodeUnit::as_instruction)
            .filter(|instruction| instruction.opcode.is_branch())
            .map(|instruction| instruction.location)
            .collect()
    }

    fn branch(map: &CodeMap, location: u32) -> Option<&Instruction> {
        map.get(location)
            .and_then(CodeUnit::as_instruction)
            .filter(|instruction| instruction.opcode.is_branch())
    }

    /// Checks the shape of the triple starting at `a`.
    fn match_triple(map: &CodeMap, a: u32, b: u32, c: u32) -> Option<Candidate> {
        let a = Self::branch(map, a)?;
        let b = Self::branch(map, b)?;
        let c = Self::branch(map, c)?;
        if !a.opcode.is_conditional_branch()
            || !b.opcode.is_unconditional_branch()
            || !c.opcode.is_conditional_branch()
        {
            return None;
        }

        let x = map.get(b.targets.first()?.location)?;
        let &[reconverge] = x.targets() else {
            return None;
        };
        if reconverge.location != c.end() {
            return None;
        }

        let sources = map.locations_branching_to(a.location);
        let &[source] = sources.as_slice() else {
            return None;
        };
        let anchor = map.get(source)?.as_command()?.range();
        if anchor.end() > a.location {
            return None;
        }

        Some(Candidate {
            anchor,
            end: c.end(),
        })
    }
}

impl ReductionPass for ShortCircuitRecovery {
    fn name(&self) -> &'static str {
        "short-circuit-recovery"
    }

    fn description(&self) -> &'static str {
        "Absorb short-circuit and ternary branch shapes into their test command"
    }

    fn run(&self, map: &mut CodeMap, ctx: &DecompilerContext) -> Result<bool> {
        let branches = Self::branches(map);
        let mut changed = false;

        for triple in branches.windows(3) {
            let Some(candidate) = Self::match_triple(map, triple[0], triple[1], triple[2]) else {
                continue;
            };

            let range = CodeRange::from_bounds(candidate.anchor.start, candidate.end)?;
            map.merge_with(range, |units| match units.first() {
                Some(CodeUnit::Command(anchor)) => Ok(anchor.expr().clone()),
                _ => Err(malformed_error!(
                    "Short-circuit anchor at {} is not a command",
                    range.start
                )),
            })?;

            changed = true;
            ctx.events
                .record(EventKind::ShortCircuitRecovered)
                .at(candidate.anchor.start)
                .pass(self.name())
                .message(format!("absorbed up to {}", candidate.end));
            self.folding.fold_to_fixpoint(map, ctx)?;
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        disassembler::{Opcode, Operand},
        test::{instr, lit, local_op},
    };

    /// ```text
    ///  0 loadScalar1 a     anchor
    ///  2 jumpTrue1 +10     A -> 12
    ///  4 loadScalar1 b
    ///  6 jump1 +10         B -> 16
    ///  8 push1 1
    /// 10 nop
    /// 11 nop
    /// 12 jumpFalse1 +4     C -> 16
    /// 14 nop
    /// 15 nop
    /// 16 jump1 <back>      X
    /// ```
    fn units(back: i32) -> Vec<CodeUnit> {
        vec![
            instr(0, Opcode::LoadScalar1, vec![local_op(0, "a")]),
            instr(2, Opcode::JumpTrue1, vec![Operand::Offset(10)]),
            instr(4, Opcode::LoadScalar1, vec![local_op(1, "b")]),
            instr(6, Opcode::Jump1, vec![Operand::Offset(10)]),
            instr(8, Opcode::Push1, vec![lit("1")]),
            instr(10, Opcode::Nop, vec![]),
            instr(11, Opcode::Nop, vec![]),
            instr(12, Opcode::JumpFalse1, vec![Operand::Offset(4)]),
            instr(14, Opcode::Nop, vec![]),
            instr(15, Opcode::Nop, vec![]),
            instr(16, Opcode::Jump1, vec![Operand::Offset(back)]),
        ]
        .into_iter()
        .map(CodeUnit::from)
        .collect()
    }

    fn reduce(units: Vec<CodeUnit>) -> (CodeMap, DecompilerContext) {
        let ctx = DecompilerContext::default();
        let mut map = CodeMap::new(units).unwrap();
        let folding = ExpressionFolding::default();
        folding.fold_to_fixpoint(&mut map, &ctx).unwrap();
        ShortCircuitRecovery::new(folding)
            .run(&mut map, &ctx)
            .unwrap();
        (map, ctx)
    }

    #[test]
    fn collapses_triple() {
        // X jumps back to 14, the end of C
        let (map, ctx) = reduce(units(-2));

        assert_eq!(ctx.events.count_of(EventKind::ShortCircuitRecovered), 1);
        let anchor = map.entry_point().and_then(CodeUnit::as_command).unwrap();
        assert_eq!(anchor.range(), CodeRange::new(0, 14));
        assert_eq!(anchor.expr().to_string(), "$a");
        assert_eq!(anchor.units().len(), 8);
        assert_eq!(ShortCircuitRecovery::branches(&map), vec![16]);
    }

    #[test]
    fn requires_reconvergence() {
        let (map, ctx) = reduce(units(-1));

        assert_eq!(ctx.events.count_of(EventKind::ShortCircuitRecovered), 0);
        assert_eq!(ShortCircuitRecovery::branches(&map), vec![2, 6, 12, 16]);
    }

    #[test]
    fn requires_reduced_anchor() {
        let ctx = DecompilerContext::default();
        let mut map = CodeMap::new(units(-2)).unwrap();

        let changed = ShortCircuitRecovery::default()
            .run(&mut map, &ctx)
            .unwrap();

        assert!(!changed);
        assert_eq!(map.len(), 11);
    }
}
