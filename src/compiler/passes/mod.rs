//! The reduction passes.
//!
//! - [`ExpressionFolding`] - instructions and their operands to commands, to a fixed point
//! - [`CatchRecovery`] - `beginCatch4` / `endCatch` spans to `catch` commands
//! - [`ShortCircuitRecovery`] - `&&`, `||` and `?:` branch shapes into their test command

mod catch;
mod folding;
mod shortcircuit;

pub use catch::CatchRecovery;
pub use folding::ExpressionFolding;
pub use shortcircuit::ShortCircuitRecovery;

use crate::{code::CodeUnit, expr::Expr};

/// The statement form of a unit inside a recovered body.
///
/// Unreduced instructions are kept as their disassembly line.
pub(crate) fn statement(unit: &CodeUnit) -> Expr {
    match unit {
        CodeUnit::Command(command) => command.expr().clone(),
        CodeUnit::Instruction(instruction) => Expr::literal(instruction.to_string()),
    }
}
