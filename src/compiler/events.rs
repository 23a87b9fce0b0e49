//! Structured record of what the reduction passes changed.
//!
//! Passes record one [`Event`] per rewrite into the [`EventLog`] of the
//! [`DecompilerContext`](crate::compiler::DecompilerContext). The log is backed by
//! `boxcar::Vec`, so nested bodies decompiled on worker threads append to the same log
//! without locking.
//!
//! # Examples
//!
//! ```rust
//! use tclscope::compiler::{EventKind, EventLog};
//!
//! let log = EventLog::new();
//! log.record(EventKind::ExpressionFolded)
//!     .at(12)
//!     .pass("expression-folding")
//!     .message("add");
//!
//! assert_eq!(log.count(), 1);
//! assert_eq!(log.count_of(EventKind::ExpressionFolded), 1);
//! ```

use std::fmt::{self, Write};

/// What kind of rewrite an [`Event`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An instruction and its operands were folded into a command
    ExpressionFolded,
    /// A value-discarding instruction was absorbed into the preceding command
    ValueDiscarded,
    /// A `beginCatch4` / `endCatch` span became a `catch` command
    CatchRecovered,
    /// A short-circuit branch triple was absorbed into its test command
    ShortCircuitRecovered,
    /// A nested procedure body or script literal was decompiled
    BodyDecompiled,
    /// A nested body could not be decompiled and was kept as its literal text
    BodyFailed,
    /// A pass stopped at its iteration limit before reaching a fixed point
    IterationLimit,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::ExpressionFolded => "expression folded",
            EventKind::ValueDiscarded => "value discarded",
            EventKind::CatchRecovered => "catch recovered",
            EventKind::ShortCircuitRecovered => "short-circuit recovered",
            EventKind::BodyDecompiled => "body decompiled",
            EventKind::BodyFailed => "body failed",
            EventKind::IterationLimit => "iteration limit",
        };
        f.write_str(name)
    }
}

/// A single recorded rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// What happened
    pub kind: EventKind,
    /// Location of the rewritten unit, if any
    pub location: Option<u32>,
    /// Name of the pass that recorded the event
    pub pass: Option<&'static str>,
    /// Free-form detail
    pub message: String,
}

impl Event {
    /// Creates an event without location, pass or message.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Event {
            kind,
            location: None,
            pass: None,
            message: String::new(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(location) = self.location {
            write!(f, " @ {}", location)?;
        }
        if let Some(pass) = self.pass {
            write!(f, " [{}]", pass)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

/// Fluent builder returned by [`EventLog::record`]. The event is appended when the builder
/// is dropped.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    event: Option<Event>,
}

impl EventBuilder<'_> {
    /// Sets the location of the rewritten unit.
    pub fn at(mut self, location: u32) -> Self {
        if let Some(event) = self.event.as_mut() {
            event.location = Some(location);
        }
        self
    }

    /// Sets the recording pass.
    pub fn pass(mut self, name: &'static str) -> Self {
        if let Some(event) = self.event.as_mut() {
            event.pass = Some(name);
        }
        self
    }

    /// Sets the detail message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(event) = self.event.as_mut() {
            event.message = message.into();
        }
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        if let Some(event) = self.event.take() {
            self.log.push(event);
        }
    }
}

/// Append-only, thread-safe collection of [`Event`]s.
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }

    /// Starts recording an event of `kind`.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder {
            log: self,
            event: Some(Event::new(kind)),
        }
    }

    /// Appends a finished event.
    pub fn push(&self, event: Event) {
        self.events.push(event);
    }

    /// Appends copies of all events of `other`.
    pub fn merge(&self, other: &EventLog) {
        for event in other.iter() {
            self.push(event.clone());
        }
    }

    /// Total number of events.
    pub fn count(&self) -> usize {
        self.events.count()
    }

    /// Returns true if no event was recorded.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of events of `kind`.
    pub fn count_of(&self, kind: EventKind) -> usize {
        self.iter().filter(|event| event.kind == kind).count()
    }

    /// Iterates over all events in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, event)| event)
    }

    /// One line per event kind with its count, followed by the failures.
    pub fn summary(&self) -> String {
        let mut output = String::new();
        let kinds = [
            EventKind::ExpressionFolded,
            EventKind::ValueDiscarded,
            EventKind::CatchRecovered,
            EventKind::ShortCircuitRecovered,
            EventKind::BodyDecompiled,
            EventKind::BodyFailed,
            EventKind::IterationLimit,
        ];

        let _ = writeln!(output, "Events: {}", self.count());
        for kind in kinds {
            let count = self.count_of(kind);
            if count > 0 {
                let _ = writeln!(output, "  {}: {}", kind, count);
            }
        }
        for event in self.iter().filter(|event| event.kind == EventKind::BodyFailed) {
            let _ = writeln!(output, "  {event}");
        }

        output
    }
}

impl fmt::Display for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
