//! The reduction pipeline that turns a code map of instructions into source commands.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Reduction Pipeline                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  DecompilerContext           Shared per-run state                │
//! │    ├─ DecompilerConfig        (pass switches, limits, layout)    │
//! │    └─ EventLog                (lock-free rewrite record)         │
//! │                                                                  │
//! │  PassScheduler               Fixed-point execution               │
//! │    ├─ Folding                 ExpressionFolding to fixed point   │
//! │    └─ Structure               catch, then short-circuit          │
//! │    Structural passes re-fold after each rewrite                  │
//! │                                                                  │
//! │  ReductionPass trait         Interface for all passes            │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every pass only merges contiguous runs of units, so the unit count strictly decreases and
//! the pipeline always terminates.

mod config;
mod context;
mod events;
mod pass;
mod passes;
mod scheduler;

pub use config::DecompilerConfig;
pub use context::DecompilerContext;
pub use events::{Event, EventBuilder, EventKind, EventLog};
pub use pass::ReductionPass;
pub use passes::{CatchRecovery, ExpressionFolding, ShortCircuitRecovery};
pub use scheduler::PassScheduler;
