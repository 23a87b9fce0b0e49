//! The interface every reduction pass implements.

use crate::{code::CodeMap, compiler::DecompilerContext, Result};

/// A rewrite of a [`CodeMap`] that merges units into commands.
///
/// Passes never split units, so the unit count only goes down. A pattern that does not match
/// is skipped silently; errors are reserved for broken map invariants.
pub trait ReductionPass: Send + Sync {
    /// Short, unique name used in events and logs.
    fn name(&self) -> &'static str;

    /// One-line description.
    fn description(&self) -> &'static str {
        ""
    }

    /// Runs the pass once over `map`.
    ///
    /// # Returns
    ///
    /// `true` if the map was changed.
    ///
    /// # Errors
    ///
    /// Returns an error if a merge violates the map's invariants.
    fn run(&self, map: &mut CodeMap, ctx: &DecompilerContext) -> Result<bool>;
}
