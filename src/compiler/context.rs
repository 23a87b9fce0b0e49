//! State shared by every pass of one decompilation.

use crate::compiler::{DecompilerConfig, EventLog};

/// The configuration and event log threaded through the reduction pipeline.
///
/// The context is shared immutably; nested bodies decompiled in parallel record into the same
/// [`EventLog`].
#[derive(Debug, Default)]
pub struct DecompilerContext {
    /// Settings of this run
    pub config: DecompilerConfig,
    /// Rewrites recorded by the passes
    pub events: EventLog,
}

impl DecompilerContext {
    /// Creates a context with an empty event log.
    #[must_use]
    pub fn new(config: DecompilerConfig) -> Self {
        DecompilerContext {
            config,
            events: EventLog::new(),
        }
    }

    /// Consumes the context and returns its event log.
    #[must_use]
    pub fn into_events(self) -> EventLog {
        self.events
    }
}
