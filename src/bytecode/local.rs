//! Compiled local variable table entries.

use std::fmt;

use bitflags::bitflags;

use crate::bytecode::Literal;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Flags stored with each compiled local, mirroring Tcl's `VAR_*` bits
    pub struct LocalFlags : u32 {
        /// The variable is an array
        const ARRAY = 1 << 0;
        /// The variable links to another variable (`upvar`, `global`)
        const LINK = 1 << 1;
        /// The variable lives in a hashtable
        const IN_HASHTABLE = 1 << 2;
        /// The variable was deleted from its hashtable
        const DEAD_HASH = 1 << 3;
        /// Read traces are set on the variable
        const TRACED_READ = 1 << 4;
        /// Write traces are set on the variable
        const TRACED_WRITE = 1 << 5;
        /// Unset traces are set on the variable
        const TRACED_UNSET = 1 << 6;
        /// The variable is a namespace variable
        const NAMESPACE_VAR = 1 << 7;
        /// The variable is a procedure argument
        const ARGUMENT = 1 << 8;
        /// The variable is a compiler temporary without a name
        const TEMPORARY = 1 << 9;
        /// The variable is the trailing `args` parameter
        const IS_ARGS = 1 << 10;
        /// Array traces are set on the variable
        const TRACED_ARRAY = 1 << 11;
        /// The variable is an array element
        const ARRAY_ELEMENT = 1 << 12;
        /// A trace on the variable is currently running
        const TRACE_ACTIVE = 1 << 13;
        /// An array search is active
        const SEARCH_ACTIVE = 1 << 14;
        /// The variable was resolved by a namespace resolver
        const RESOLVED = 1 << 15;

        /// Every trace bit
        const ALL_TRACES = Self::TRACED_READ.bits()
            | Self::TRACED_WRITE.bits()
            | Self::TRACED_ARRAY.bits()
            | Self::TRACED_UNSET.bits();
    }
}

/// One entry of a procedure's compiled local table.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    /// Variable name, empty for compiler temporaries
    pub name: String,
    /// Slot index in the call frame
    pub frame_index: i32,
    /// Flags describing the variable
    pub flags: LocalFlags,
    /// Default value of an optional procedure argument
    pub default_value: Option<Literal>,
}

impl Local {
    /// Returns `true` if the local is an argument with a default value.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Returns `true` if the local is a procedure argument.
    #[must_use]
    pub fn is_argument(&self) -> bool {
        self.flags.contains(LocalFlags::ARGUMENT)
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
