//! Exception ranges: the loop and catch regions of a bytecode unit.

use strum::{Display, EnumIter, FromRepr};

use crate::code::CodeRange;

/// Kind of an exception range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(u8)]
pub enum ExceptionType {
    /// `break`/`continue` target region of a loop
    Loop = b'L',
    /// Region protected by `catch`
    Catch = b'C',
}

impl ExceptionType {
    /// Looks up the exception type for a container tag character.
    #[must_use]
    pub fn from_char(tag: char) -> Option<Self> {
        u8::try_from(tag).ok().and_then(Self::from_repr)
    }
}

/// A loop or catch region and the locations control transfers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExceptionRange {
    /// Loop or catch
    pub kind: ExceptionType,
    /// Nesting depth, outermost is 0
    pub nesting_level: i32,
    /// First location of the region
    pub code_offset: u32,
    /// Length of the region in bytes
    pub num_code_bytes: u32,
    /// Where `break` jumps to
    pub break_offset: i32,
    /// Where `continue` jumps to
    pub continue_offset: i32,
    /// Where an error inside a catch region continues
    pub catch_offset: i32,
}

impl ExceptionRange {
    /// The covered code region.
    #[must_use]
    pub fn code_range(&self) -> CodeRange {
        CodeRange::new(self.code_offset, self.num_code_bytes)
    }

    /// Returns `true` if `location` lies inside the region.
    #[must_use]
    pub fn contains(&self, location: u32) -> bool {
        self.code_range().contains(location)
    }

    /// Returns `true` for loop regions.
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.kind == ExceptionType::Loop
    }
}
