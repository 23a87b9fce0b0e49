//! Code units and the graph they form.
//!
//! The disassembler produces [`Instruction`](crate::disassembler::Instruction)s, which are
//! wrapped as [`CodeUnit`]s and collected into a [`CodeMap`]. The reduction passes then merge
//! runs of units into [`Command`]s until only recovered statements remain.
//!
//! # Key Components
//!
//! - [`CodeRange`] - Half-open location spans
//! - [`BranchTarget`] - Outgoing control-flow edges
//! - [`CodeUnit`] / [`Command`] - The units held by a map
//! - [`CodeMap`] - The indexed unit graph
//! - [`CodeGraphWalker`] - Depth-first traversal with branch hooks

mod command;
mod map;
mod range;
mod target;
mod unit;
mod walker;

pub use command::Command;
pub use map::CodeMap;
pub use range::CodeRange;
pub use target::{BranchKind, BranchTarget};
pub use unit::{CodeUnit, UnitKind};
pub use walker::CodeGraphWalker;
