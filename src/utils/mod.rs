//! Shared data structures.

pub mod rangetree;

pub use rangetree::{NodeId, RangeTree};
