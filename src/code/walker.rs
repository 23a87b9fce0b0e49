//! Depth-first traversal of a [`CodeMap`] along its branch edges.

use std::collections::HashSet;

use crate::code::{BranchKind, BranchTarget, CodeMap, CodeUnit};

/// Hooks for a depth-first walk over the units of a code map.
///
/// Conditional edges are followed first, each inside an
/// [`on_begin_branch`](CodeGraphWalker::on_begin_branch) /
/// [`on_end_branch`](CodeGraphWalker::on_end_branch) bracket. Fallthrough and unconditional
/// edges are followed afterwards without a bracket. A unit is entered once per walk unless
/// [`on_cycle_detected`](CodeGraphWalker::on_cycle_detected) asks for a revisit.
///
/// The traversal keeps its own frame stack, so arbitrarily long straight-line code does not
/// grow the call stack.
///
/// # Examples
///
/// ```rust
/// use tclscope::code::{CodeGraphWalker, CodeMap, CodeUnit};
/// use tclscope::disassembler::{Instruction, Opcode};
///
/// struct Counter(usize);
///
/// impl CodeGraphWalker for Counter {
///     fn on_visiting(&mut self, _map: &CodeMap, _unit: &CodeUnit) {
///         self.0 += 1;
///     }
/// }
///
/// let map = CodeMap::new((0..3).map(|loc| CodeUnit::from(Instruction::new(loc, Opcode::Nop, vec![]))))?;
/// let mut counter = Counter(0);
/// counter.walk(&map);
/// assert_eq!(counter.0, 3);
/// # Ok::<(), tclscope::Error>(())
/// ```
pub trait CodeGraphWalker {
    /// Called when a unit is entered.
    fn on_visiting(&mut self, map: &CodeMap, unit: &CodeUnit);

    /// Called when an edge leads to an already visited unit. Returning `true` enters it again.
    fn on_cycle_detected(&mut self, _map: &CodeMap, _from: &CodeUnit, _to: &CodeUnit) -> bool {
        false
    }

    /// Called before following a conditional edge.
    fn on_begin_branch(&mut self, _map: &CodeMap, _from: &CodeUnit, _to: &CodeUnit) {}

    /// Called after the walk along a conditional edge returned to its origin.
    ///
    /// `last` is the last unit entered inside the branch.
    fn on_end_branch(&mut self, _map: &CodeMap, _last: &CodeUnit, _origin: &CodeUnit) {}

    /// Called exactly once when the walk completes or aborts.
    fn on_end(&mut self, _map: &CodeMap) {}

    /// Stops the walk as soon as it returns `true`.
    fn is_aborted(&self) -> bool {
        false
    }

    /// Walks from the lowest-location unit.
    fn walk(&mut self, map: &CodeMap) {
        match map.entry_point() {
            Some(entry) => self.walk_from(map, entry.location()),
            None => self.on_end(map),
        }
    }

    /// Walks from the unit at `location`. Nothing is visited if no unit starts there.
    fn walk_from(&mut self, map: &CodeMap, location: u32) {
        walk_graph(self, map, location);
        self.on_end(map);
    }
}

struct Frame {
    location: u32,
    targets: Vec<BranchTarget>,
    next: usize,
    bracketed: bool,
}

impl Frame {
    fn new(unit: &CodeUnit) -> Self {
        let conditional = unit
            .targets()
            .iter()
            .filter(|target| target.kind == BranchKind::Conditional);
        let other = unit.targets().iter().filter(|target| {
            !matches!(target.kind, BranchKind::Conditional | BranchKind::None)
        });

        Frame {
            location: unit.location(),
            targets: conditional.chain(other).copied().collect(),
            next: 0,
            bracketed: false,
        }
    }
}

fn walk_graph<W: CodeGraphWalker + ?Sized>(walker: &mut W, map: &CodeMap, start: u32) {
    let Some(entry) = map.get(start) else {
        return;
    };
    if walker.is_aborted() {
        return;
    }

    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    let mut last = start;

    visited.insert(start);
    walker.on_visiting(map, entry);
    stack.push(Frame::new(entry));

    while !walker.is_aborted() {
        let Some(frame) = stack.last_mut() else {
            break;
        };

        let Some(target) = frame.targets.get(frame.next).copied() else {
            stack.pop();
            if let Some(parent) = stack.last_mut() {
                if parent.bracketed {
                    parent.bracketed = false;
                    if let (Some(last), Some(origin)) = (map.get(last), map.get(parent.location)) {
                        walker.on_end_branch(map, last, origin);
                    }
                }
            }
            continue;
        };
        frame.next += 1;

        let (Some(from), Some(to)) = (map.get(frame.location), map.get(target.location)) else {
            continue;
        };
        if visited.contains(&target.location) && !walker.on_cycle_detected(map, from, to) {
            continue;
        }

        if target.kind == BranchKind::Conditional {
            frame.bracketed = true;
            walker.on_begin_branch(map, from, to);
            if walker.is_aborted() {
                break;
            }
        }

        visited.insert(target.location);
        walker.on_visiting(map, to);
        last = target.location;
        stack.push(Frame::new(to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::{Instruction, Opcode, Operand};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        limit: Option<usize>,
        visits: usize,
        aborted: bool,
        ends: usize,
    }

    impl CodeGraphWalker for Recorder {
        fn on_visiting(&mut self, _map: &CodeMap, unit: &CodeUnit) {
            self.events.push(format!("visit {}", unit.location()));
            self.visits += 1;
            if self.limit == Some(self.visits) {
                self.aborted = true;
            }
        }

        fn on_begin_branch(&mut self, _map: &CodeMap, from: &CodeUnit, to: &CodeUnit) {
            self.events
                .push(format!("begin {} -> {}", from.location(), to.location()));
        }

        fn on_end_branch(&mut self, _map: &CodeMap, last: &CodeUnit, origin: &CodeUnit) {
            self.events
                .push(format!("end {} <- {}", last.location(), origin.location()));
        }

        fn on_end(&mut self, _map: &CodeMap) {
            self.ends += 1;
        }

        fn is_aborted(&self) -> bool {
            self.aborted
        }
    }

    fn branchy() -> CodeMap {
        // 0: jumpFalse1 +4, 2: jump1 +3, 4: nop, 5: done
        CodeMap::new(vec![
            CodeUnit::from(Instruction::new(0, Opcode::JumpFalse1, vec![Operand::Offset(4)])),
            CodeUnit::from(Instruction::new(2, Opcode::Jump1, vec![Operand::Offset(3)])),
            CodeUnit::from(Instruction::new(4, Opcode::Nop, vec![])),
            CodeUnit::from(Instruction::new(5, Opcode::Done, vec![])),
        ])
        .unwrap()
    }

    #[test]
    fn hook_order() {
        let mut recorder = Recorder::default();
        recorder.walk(&branchy());

        assert_eq!(
            recorder.events,
            vec![
                "visit 0",
                "begin 0 -> 4",
                "visit 4",
                "visit 5",
                "end 5 <- 0",
                "visit 2",
            ]
        );
        assert_eq!(recorder.ends, 1);
    }

    #[test]
    fn abort_stops_immediately() {
        let mut recorder = Recorder {
            limit: Some(2),
            ..Recorder::default()
        };
        recorder.walk(&branchy());

        assert_eq!(recorder.events, vec!["visit 0", "begin 0 -> 4", "visit 4"]);
        assert_eq!(recorder.ends, 1);
    }

    #[test]
    fn empty_map_still_ends() {
        let mut recorder = Recorder::default();
        recorder.walk(&CodeMap::default());
        recorder.walk_from(&branchy(), 1);

        assert!(recorder.events.is_empty());
        assert_eq!(recorder.ends, 2);
    }

    #[test]
    fn long_chains() {
        let map = CodeMap::new(
            (0..50_000).map(|loc| CodeUnit::from(Instruction::new(loc, Opcode::Nop, vec![]))),
        )
        .unwrap();

        let mut recorder = Recorder::default();
        recorder.walk(&map);
        assert_eq!(recorder.visits, 50_000);
    }
}
