//! Outgoing control-flow edges of a code unit.

use std::fmt;

/// How control reaches a [`BranchTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BranchKind {
    /// No transfer of control
    None,
    /// Execution continues with the next instruction
    Fallthrough,
    /// Always taken
    Unconditional,
    /// Taken depending on the popped stack value
    Conditional,
}

/// A directed edge from a unit to the location control may continue at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchTarget {
    /// Absolute location of the destination
    pub location: u32,
    /// How the destination is reached
    pub kind: BranchKind,
}

impl BranchTarget {
    /// Creates a new edge.
    #[must_use]
    pub const fn new(location: u32, kind: BranchKind) -> Self {
        BranchTarget { location, kind }
    }

    /// Edge to the instruction directly behind the unit.
    #[must_use]
    pub const fn fallthrough(location: u32) -> Self {
        BranchTarget::new(location, BranchKind::Fallthrough)
    }

    /// Returns `true` if this edge is an explicit jump rather than a fallthrough.
    #[must_use]
    pub fn is_jump(&self) -> bool {
        matches!(
            self.kind,
            BranchKind::Conditional | BranchKind::Unconditional
        )
    }
}

impl fmt::Display for BranchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {}", self.kind, self.location)
    }
}
