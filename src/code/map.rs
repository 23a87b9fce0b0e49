//! The location-indexed graph of code units rewritten by the reduction passes.
//!
//! A [`CodeMap`] owns every unit of one bytecode body and keeps three views of them in step:
//!
//! - a location index (`HashMap<u32, CodeUnit>`) for exact lookups,
//! - an order-statistic tree over the locations ([`RangeTree`]) for ordered iteration, range
//!   queries and position-based access,
//! - a reverse-edge index from a target location to the ordered set of source locations.
//!
//! Unit ranges never overlap. The bounding [`CodeMap::range`] and [`CodeMap::is_sequential`]
//! are recomputed by every mutator.

use std::collections::{hash_map::Entry, BTreeSet, HashMap};

use crate::{
    code::{CodeRange, CodeUnit, Command, UnitKind},
    expr::Expr,
    utils::RangeTree,
    Error::{Conflict, Misaligned},
    Result,
};

/// Ordered, indexed collection of non-overlapping code units.
///
/// # Examples
///
/// ```rust
/// use tclscope::code::{CodeMap, CodeUnit};
/// use tclscope::disassembler::{Instruction, Opcode};
///
/// let units = vec![
///     CodeUnit::from(Instruction::new(0, Opcode::Nop, vec![])),
///     CodeUnit::from(Instruction::new(1, Opcode::Done, vec![])),
/// ];
/// let map = CodeMap::new(units)?;
///
/// assert_eq!(map.len(), 2);
/// assert!(map.is_sequential());
/// assert_eq!(map.locations_branching_to(1), vec![0]);
/// # Ok::<(), tclscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeMap {
    code: HashMap<u32, CodeUnit>,
    locations: RangeTree,
    sources: HashMap<u32, BTreeSet<u32>>,
    range: CodeRange,
    sequential: bool,
    covered: u64,
}

impl CodeMap {
    /// Builds a map from units with pairwise distinct, non-overlapping locations.
    ///
    /// # Errors
    /// Returns [`crate::Error::Conflict`] if two units share or overlap a location.
    pub fn new(units: impl IntoIterator<Item = CodeUnit>) -> Result<CodeMap> {
        let mut map = CodeMap::default();
        map.add_range(units.into_iter().collect())?;
        Ok(map)
    }

    /// Inserts a single unit.
    ///
    /// # Errors
    /// Returns [`crate::Error::Conflict`] if the unit's range is already (partly) occupied.
    pub fn add(&mut self, unit: CodeUnit) -> Result<()> {
        self.check_free(unit.range())?;
        self.insert(unit);
        self.refresh();
        Ok(())
    }

    /// Inserts several units. Every unit is checked before any is inserted.
    ///
    /// # Errors
    /// Returns [`crate::Error::Conflict`] if a unit overlaps the map or another new unit.
    pub fn add_range(&mut self, units: Vec<CodeUnit>) -> Result<()> {
        let mut ranges = Vec::with_capacity(units.len());
        for unit in &units {
            let range = unit.range();
            self.check_free(range)?;
            ranges.push(range);
        }

        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            if pair[0].start == pair[1].start || pair[0].end() > pair[1].start {
                return Err(Conflict(pair[1].start));
            }
        }

        for unit in units {
            self.insert(unit);
        }
        self.refresh();
        Ok(())
    }

    /// Replaces the units covered by `unit`'s range with `unit`.
    ///
    /// If no unit lies inside the range this is a plain [`CodeMap::add`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Misaligned`] if the covered units do not start and end exactly
    /// on the range boundaries, or [`crate::Error::Conflict`] if `unit` overlaps a neighbour.
    pub fn merge(&mut self, unit: CodeUnit) -> Result<()> {
        let range = unit.range();
        let covered = self.aligned_run(range)?;
        if covered.is_empty() {
            return self.add(unit);
        }

        for location in covered {
            self.take(location);
        }
        self.insert(unit);
        self.refresh();
        Ok(())
    }

    /// Replaces the contiguous units covering exactly `range` with one [`Command`].
    ///
    /// `build` receives the absorbed units in location order and returns the expression of the
    /// new command. The units are moved into the command. If `build` fails, the map is left
    /// exactly as it was.
    ///
    /// # Errors
    /// Returns [`crate::Error::Misaligned`] if `range` is empty, does not align to unit
    /// boundaries or covers a gap, and propagates any error of `build`.
    pub fn merge_with<F>(&mut self, range: CodeRange, build: F) -> Result<()>
    where
        F: FnOnce(&[CodeUnit]) -> Result<Expr>,
    {
        self.merge_units(range, None, build)
    }

    /// Like [`CodeMap::merge_with`], but the new command gets `stack_effect` instead of the
    /// summed effect of the absorbed units.
    ///
    /// # Errors
    /// Same as [`CodeMap::merge_with`].
    pub fn merge_with_effect<F>(
        &mut self,
        range: CodeRange,
        stack_effect: i32,
        build: F,
    ) -> Result<()>
    where
        F: FnOnce(&[CodeUnit]) -> Result<Expr>,
    {
        self.merge_units(range, Some(stack_effect), build)
    }

    fn merge_units<F>(
        &mut self,
        range: CodeRange,
        stack_effect: Option<i32>,
        build: F,
    ) -> Result<()>
    where
        F: FnOnce(&[CodeUnit]) -> Result<Expr>,
    {
        let covered = self.aligned_run(range)?;
        let misaligned = Misaligned {
            start: range.start,
            end: range.end(),
        };
        if covered.is_empty() {
            return Err(misaligned);
        }
        for pair in covered.windows(2) {
            if self.code.get(&pair[0]).map(CodeUnit::end) != Some(pair[1]) {
                return Err(misaligned);
            }
        }

        let units: Vec<CodeUnit> = covered
            .iter()
            .filter_map(|location| self.take(*location))
            .collect();

        match build(&units) {
            Ok(expr) => {
                let mut command = Command::new(units, expr)?;
                if let Some(stack_effect) = stack_effect {
                    command = command.with_stack_effect(stack_effect);
                }
                self.insert(CodeUnit::Command(command));
                self.refresh();
                Ok(())
            }
            Err(error) => {
                for unit in units {
                    self.insert(unit);
                }
                self.refresh();
                Err(error)
            }
        }
    }

    /// Removes `unit` if the map holds an equal unit at its location.
    pub fn remove(&mut self, unit: &CodeUnit) -> bool {
        if self.code.get(&unit.location()) != Some(unit) {
            return false;
        }

        self.take(unit.location());
        self.refresh();
        true
    }

    /// Removes and returns the unit at `location`.
    pub fn remove_location(&mut self, location: u32) -> Option<CodeUnit> {
        let unit = self.take(location)?;
        self.refresh();
        Some(unit)
    }

    /// Removes every unit whose location lies inside `range`. Returns `true` if any was removed.
    pub fn remove_range(&mut self, range: CodeRange) -> bool {
        let locations = self.locations_in_range(range);
        for location in &locations {
            self.take(*location);
        }
        self.refresh();
        !locations.is_empty()
    }

    /// Looks up the unit at exactly `location`, optionally narrowed to one variant.
    #[must_use]
    pub fn try_get_unit(&self, location: u32, kind: Option<UnitKind>) -> Option<&CodeUnit> {
        self.code
            .get(&location)
            .filter(|unit| kind.map_or(true, |kind| unit.kind() == kind))
    }

    /// The unit at exactly `location`.
    #[must_use]
    pub fn get(&self, location: u32) -> Option<&CodeUnit> {
        self.code.get(&location)
    }

    /// Returns `true` if a unit starts at `location`.
    #[must_use]
    pub fn contains_location(&self, location: u32) -> bool {
        self.code.contains_key(&location)
    }

    /// Position of the unit at `location` in the ordered sequence.
    #[must_use]
    pub fn index_of_code(&self, location: u32) -> Option<usize> {
        self.locations.index_of(location)
    }

    /// Location of the unit at position `index`.
    #[must_use]
    pub fn location_at_index(&self, index: usize) -> Option<u32> {
        self.locations.at(index)
    }

    /// The unit at position `index`.
    #[must_use]
    pub fn code_at_index(&self, index: usize) -> Option<&CodeUnit> {
        self.location_at_index(index)
            .and_then(|location| self.code.get(&location))
    }

    /// `count` units starting at position `start`, truncated at the end of the map.
    #[must_use]
    pub fn code_in_index_range(&self, start: usize, count: usize) -> Vec<&CodeUnit> {
        (start..start.saturating_add(count))
            .map_while(|index| self.code_at_index(index))
            .collect()
    }

    /// Locations of the units starting inside the half-open `range`, ascending.
    #[must_use]
    pub fn locations_in_range(&self, range: CodeRange) -> Vec<u32> {
        self.locations.range(range.start, range.end())
    }

    /// Units starting inside the half-open `range`, ascending.
    #[must_use]
    pub fn code_in_range(&self, range: CodeRange) -> Vec<&CodeUnit> {
        self.locations_in_range(range)
            .into_iter()
            .filter_map(|location| self.code.get(&location))
            .collect()
    }

    /// Returns `true` if any unit starts inside `range`.
    #[must_use]
    pub fn has_code_in_range(&self, range: CodeRange) -> bool {
        !self.locations_in_range(range).is_empty()
    }

    /// Returns `true` if control neither leaves nor enters `range` other than through its ends.
    ///
    /// Units inside may target any location in `[start, end]`; every edge into a unit inside
    /// must come from a unit inside.
    #[must_use]
    pub fn is_range_self_contained(&self, range: CodeRange) -> bool {
        for location in self.locations_in_range(range) {
            let Some(unit) = self.code.get(&location) else {
                continue;
            };
            if unit
                .targets()
                .iter()
                .any(|target| target.location < range.start || target.location > range.end())
            {
                return false;
            }
            if self
                .sources
                .get(&location)
                .is_some_and(|sources| sources.iter().any(|source| !range.contains(*source)))
            {
                return false;
            }
        }

        true
    }

    /// Locations of the units with an edge to `location`, ascending.
    #[must_use]
    pub fn locations_branching_to(&self, location: u32) -> Vec<u32> {
        self.sources
            .get(&location)
            .map(|sources| sources.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Units with an edge to `location`, ascending by location.
    #[must_use]
    pub fn code_branching_to(&self, location: u32) -> Vec<&CodeUnit> {
        self.sources
            .get(&location)
            .map(|sources| {
                sources
                    .iter()
                    .filter_map(|source| self.code.get(source))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Units no edge points to.
    #[must_use]
    pub fn find_roots(&self) -> Vec<&CodeUnit> {
        self.units()
            .filter(|unit| {
                self.sources
                    .get(&unit.location())
                    .map_or(true, BTreeSet::is_empty)
            })
            .collect()
    }

    /// Units without outgoing edges.
    #[must_use]
    pub fn find_leafs(&self) -> Vec<&CodeUnit> {
        self.units().filter(|unit| unit.targets().is_empty()).collect()
    }

    /// Sorted basic-block boundaries.
    ///
    /// Every edge destination and the end of every unit with outgoing edges starts a block,
    /// except the end of the map itself.
    #[must_use]
    pub fn block_boundaries(&self) -> Vec<u32> {
        let end = self.range.end();
        let mut boundaries = BTreeSet::new();

        for unit in self.units() {
            if unit.targets().is_empty() {
                continue;
            }
            boundaries.insert(unit.end());
            boundaries.extend(unit.targets().iter().map(|target| target.location));
        }
        boundaries.remove(&end);

        boundaries.into_iter().collect()
    }

    /// Ranges between consecutive [`CodeMap::block_boundaries`], ascending.
    #[must_use]
    pub fn basic_block_ranges(&self) -> Vec<CodeRange> {
        self.block_boundaries()
            .windows(2)
            .map(|pair| CodeRange::new(pair[0], pair[1] - pair[0]))
            .collect()
    }

    /// A new map holding copies of the units starting inside `range`.
    ///
    /// # Errors
    /// Never fails for a consistent map; construction errors are propagated.
    pub fn submap(&self, range: CodeRange) -> Result<CodeMap> {
        CodeMap::new(self.code_in_range(range).into_iter().cloned())
    }

    /// All units in location order.
    pub fn units(&self) -> impl Iterator<Item = &CodeUnit> + '_ {
        self.locations
            .iter()
            .filter_map(move |location| self.code.get(&location))
    }

    /// All locations, ascending.
    pub fn locations(&self) -> impl Iterator<Item = u32> + '_ {
        self.locations.iter()
    }

    /// Consumes the map and returns its units in location order.
    #[must_use]
    pub fn into_units(mut self) -> Vec<CodeUnit> {
        let order: Vec<u32> = self.locations.iter().collect();
        order
            .into_iter()
            .filter_map(|location| self.code.remove(&location))
            .collect()
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns `true` if the map holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The lowest-location unit.
    #[must_use]
    pub fn entry_point(&self) -> Option<&CodeUnit> {
        self.locations
            .min()
            .and_then(|location| self.code.get(&location))
    }

    /// Bounding range of all units.
    #[must_use]
    pub fn range(&self) -> CodeRange {
        self.range
    }

    /// Returns `true` if the map is non-empty and its units tile [`CodeMap::range`] without gaps.
    #[must_use]
    pub fn is_sequential(&self) -> bool {
        self.sequential
    }

    fn check_free(&self, range: CodeRange) -> Result<()> {
        if self.code.contains_key(&range.start) {
            return Err(Conflict(range.start));
        }

        let rank = self.locations.rank(range.start);
        if let Some(previous) = rank
            .checked_sub(1)
            .and_then(|index| self.code_at_index(index))
        {
            if previous.end() > range.start {
                return Err(Conflict(range.start));
            }
        }
        if let Some(next) = self.locations.at(rank) {
            if next < range.end() {
                return Err(Conflict(next));
            }
        }

        Ok(())
    }

    /// Locations covered by `range`, verified to start and end on its boundaries.
    fn aligned_run(&self, range: CodeRange) -> Result<Vec<u32>> {
        let misaligned = Misaligned {
            start: range.start,
            end: range.end(),
        };

        let rank = self.locations.rank(range.start);
        if let Some(previous) = rank
            .checked_sub(1)
            .and_then(|index| self.code_at_index(index))
        {
            if previous.end() > range.start {
                return Err(misaligned);
            }
        }

        let covered = self.locations_in_range(range);
        if let (Some(first), Some(last)) = (covered.first(), covered.last()) {
            let last_end = self.code.get(last).map(CodeUnit::end);
            if *first != range.start || last_end != Some(range.end()) {
                return Err(misaligned);
            }
        }

        Ok(covered)
    }

    fn insert(&mut self, unit: CodeUnit) {
        let location = unit.location();
        for target in unit.targets() {
            self.sources
                .entry(target.location)
                .or_default()
                .insert(location);
        }
        self.covered += u64::from(unit.size());
        self.locations.insert(location);
        self.code.insert(location, unit);
    }

    fn take(&mut self, location: u32) -> Option<CodeUnit> {
        let unit = self.code.remove(&location)?;
        self.locations.remove(location);
        self.covered -= u64::from(unit.size());
        for target in unit.targets() {
            if let Entry::Occupied(mut entry) = self.sources.entry(target.location) {
                entry.get_mut().remove(&location);
                if entry.get().is_empty() {
                    entry.remove();
                }
            }
        }
        Some(unit)
    }

    fn refresh(&mut self) {
        let bounds = self.locations.min().zip(
            self.locations
                .max()
                .and_then(|location| self.code.get(&location))
                .map(CodeUnit::end),
        );

        match bounds {
            Some((start, end)) => {
                self.range = CodeRange::new(start, end - start);
                self.sequential = self.covered == u64::from(self.range.length);
            }
            None => {
                self.range = CodeRange::default();
                self.sequential = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        code::{BranchKind, BranchTarget},
        disassembler::{Instruction, Opcode, Operand},
        Error,
    };

    fn nop(location: u32) -> CodeUnit {
        CodeUnit::from(Instruction::new(location, Opcode::Nop, vec![]))
    }

    fn jump(location: u32, offset: i32) -> CodeUnit {
        CodeUnit::from(Instruction::new(
            location,
            Opcode::Jump1,
            vec![Operand::Offset(offset)],
        ))
    }

    fn jump_false(location: u32, offset: i32) -> CodeUnit {
        CodeUnit::from(Instruction::new(
            location,
            Opcode::JumpFalse1,
            vec![Operand::Offset(offset)],
        ))
    }

    fn nops(count: u32) -> CodeMap {
        CodeMap::new((0..count).map(nop)).unwrap()
    }

    fn assert_consistent(map: &CodeMap) {
        let units: Vec<&CodeUnit> = map.units().collect();
        for pair in units.windows(2) {
            assert!(pair[0].end() <= pair[1].location());
        }
        if let (Some(first), Some(last)) = (units.first(), units.last()) {
            let span = last.end() - first.location();
            assert_eq!(map.range(), CodeRange::new(first.location(), span));
        }
        assert_eq!(units.len(), map.len());
    }

    #[test]
    fn construction() {
        let map = nops(4);
        assert_eq!(map.range(), CodeRange::new(0, 4));
        assert!(map.is_sequential());
        assert_eq!(map.entry_point().map(CodeUnit::location), Some(0));

        assert!(matches!(
            CodeMap::new(vec![nop(1), nop(1)]),
            Err(Error::Conflict(1))
        ));
        assert!(!CodeMap::default().is_sequential());
    }

    #[test]
    fn gaps_are_not_sequential() {
        let map = CodeMap::new(vec![nop(0), nop(2)]).unwrap();
        assert_eq!(map.range(), CodeRange::new(0, 3));
        assert!(!map.is_sequential());
    }

    #[test]
    fn add_conflicts() {
        let mut map = nops(2);
        assert!(matches!(map.add(nop(1)), Err(Error::Conflict(1))));
        assert!(matches!(map.add(jump(1, 3)), Err(Error::Conflict(1))));

        map.add(nop(2)).unwrap();
        assert!(map.is_sequential());

        assert!(map.add_range(vec![nop(5), nop(1)]).is_err());
        assert_eq!(map.len(), 3);
        assert!(!map.contains_location(5));
    }

    #[test]
    fn merge_arithmetic() {
        let mut map = nops(6);
        let range = map.range();
        let run = map.code_in_range(CodeRange::new(1, 3)).into_iter().cloned().collect();
        let command = Command::new(run, Expr::literal("x")).unwrap();

        map.merge(CodeUnit::Command(command)).unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(map.range(), range);
        assert!(map.is_sequential());
        assert_eq!(map.try_get_unit(1, Some(UnitKind::Command)).map(CodeUnit::size), Some(3));
        assert!(map.try_get_unit(1, Some(UnitKind::Instruction)).is_none());
        assert!(map.get(2).is_none());
        assert_consistent(&map);
    }

    #[test]
    fn merge_misaligned() {
        let mut map = CodeMap::new(vec![jump(0, 4), nop(2), nop(3)]).unwrap();

        let result = map.merge_with(CodeRange::new(1, 2), |_| Ok(Expr::literal("x")));
        assert!(matches!(result, Err(Error::Misaligned { start: 1, end: 3 })));

        let result = map.merge_with(CodeRange::new(0, 5), |_| Ok(Expr::literal("x")));
        assert!(matches!(result, Err(Error::Misaligned { start: 0, end: 5 })));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn merge_with_restores_on_failure() {
        let mut map = nops(3);
        let before: Vec<CodeUnit> = map.units().cloned().collect();

        let result = map.merge_with(CodeRange::new(0, 2), |units| {
            assert_eq!(units.len(), 2);
            Err(Error::Error("rejected".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(map.units().cloned().collect::<Vec<_>>(), before);
        assert!(map.is_sequential());
    }

    #[test]
    fn merge_with_moves_units() {
        let mut map = CodeMap::new(vec![nop(0), nop(1), jump(2, -2)]).unwrap();
        map.merge_with(CodeRange::new(1, 3), |units| {
            Ok(Expr::literal(format!("{} units", units.len())))
        })
        .unwrap();

        let command = map.get(1).and_then(CodeUnit::as_command).unwrap();
        assert_eq!(command.units().len(), 2);
        assert_eq!(command.expr(), &Expr::literal("2 units"));
        assert_eq!(map.locations_branching_to(0), vec![1]);
        assert!(map.locations_branching_to(2).is_empty());
    }

    #[test]
    fn merge_with_effect_overrides_sum() {
        let push = |location: u32| {
            CodeUnit::from(Instruction::new(
                location,
                Opcode::Push1,
                vec![Operand::Literal {
                    index: 0,
                    text: "0".to_string(),
                }],
            ))
        };
        let mut map = CodeMap::new(vec![push(0), push(2), nop(4)]).unwrap();

        map.merge_with_effect(CodeRange::new(0, 4), 1, |_| Ok(Expr::literal("x")))
            .unwrap();

        let command = map.get(0).and_then(CodeUnit::as_command).unwrap();
        assert_eq!(command.units().len(), 2);
        assert_eq!(command.stack_effect(), 1);
        assert_consistent(&map);
    }

    #[test]
    fn unit_at_end_of_address_space() {
        let push4 = CodeUnit::from(Instruction::new(
            u32::MAX - 1,
            Opcode::Push4,
            vec![Operand::Literal {
                index: 0,
                text: "x".to_string(),
            }],
        ));
        let mut map = nops(1);
        map.add(push4).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.range().end(), u32::MAX);
        assert!(!map.is_sequential());
        assert!(map.contains_location(u32::MAX - 1));
    }

    #[test]
    fn half_open_queries() {
        let map = nops(10);
        assert_eq!(map.locations_in_range(CodeRange::new(2, 3)), vec![2, 3, 4]);
        assert!(!map.has_code_in_range(CodeRange::new(20, 5)));
        assert_eq!(map.index_of_code(7), Some(7));
        assert_eq!(map.location_at_index(3), Some(3));
        assert_eq!(map.code_in_index_range(8, 5).len(), 2);

        let sub = map.submap(CodeRange::new(3, 4)).unwrap();
        assert_eq!(sub.range(), CodeRange::new(3, 4));
    }

    #[test]
    fn remove() {
        let mut map = nops(4);
        assert!(!map.remove(&nop(7)));
        assert!(map.remove(&nop(3)));
        assert_eq!(map.range(), CodeRange::new(0, 3));

        assert!(map.remove_location(1).is_some());
        assert!(!map.is_sequential());

        assert!(map.remove_range(CodeRange::new(0, 3)));
        assert!(map.is_empty());
        assert_eq!(map.range(), CodeRange::default());
    }

    #[test]
    fn reverse_edges() {
        // 0: jumpFalse -> 4, 2: jump -> 5, 4: nop, 5: nop
        let map = CodeMap::new(vec![jump_false(0, 4), jump(2, 3), nop(4), nop(5)]).unwrap();

        assert_eq!(map.locations_branching_to(4), vec![0]);
        assert_eq!(map.locations_branching_to(5), vec![2, 4]);
        assert_eq!(map.code_branching_to(2)[0].targets()[0].kind, BranchKind::Conditional);

        let roots: Vec<u32> = map.find_roots().into_iter().map(CodeUnit::location).collect();
        assert_eq!(roots, vec![0]);
        assert!(map.find_leafs().is_empty());
    }

    #[test]
    fn self_contained() {
        let units = vec![jump_false(0, 6), nop(2), jump(3, -1), nop(5), nop(6)];
        let map = CodeMap::new(units).unwrap();

        assert!(map.is_range_self_contained(CodeRange::new(0, 6)));
        assert!(!map.is_range_self_contained(CodeRange::new(2, 3)));
        assert!(!map.is_range_self_contained(CodeRange::new(3, 3)));
    }

    #[test]
    fn basic_blocks() {
        let command = |units: Vec<CodeUnit>| {
            CodeUnit::Command(Command::new(units, Expr::literal("x")).unwrap())
        };

        // [0, 10) ends in a conditional jump to 20, [10, 15) and [15, 20) fall through
        let mut head: Vec<CodeUnit> = (0..8).map(nop).collect();
        head.push(jump_false(8, 12));
        let map = CodeMap::new(vec![
            command(head),
            command((10..15).map(nop).collect()),
            command((15..20).map(nop).collect()),
            CodeUnit::from(Instruction::new(20, Opcode::Done, vec![])),
        ])
        .unwrap();

        assert_eq!(map.block_boundaries(), vec![10, 15, 20]);
        assert_eq!(
            map.basic_block_ranges(),
            vec![CodeRange::new(10, 5), CodeRange::new(15, 5)]
        );
    }

    #[test]
    fn targets_follow_merges() {
        let mut map = CodeMap::new(vec![nop(0), jump(1, 3), nop(3), nop(4)]).unwrap();
        map.merge_with(CodeRange::new(0, 3), |_| Ok(Expr::literal("x"))).unwrap();

        assert_eq!(
            map.get(0).map(|unit| unit.targets().to_vec()),
            Some(vec![BranchTarget::new(4, BranchKind::Unconditional)])
        );
        assert_eq!(map.locations_branching_to(4), vec![0, 3]);
    }
}
