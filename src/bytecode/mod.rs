//! Tcl bytecode containers as produced by TclPro's compiler.
//!
//! A `.tbc` file carries one top-level [`Bytecode`] unit. Besides the raw instruction bytes, a
//! unit holds everything the interpreter needs to run it: the literal pool, the loop and catch
//! regions, auxiliary tables for `foreach`, `dict update` and `switch`, and for procedure bodies
//! the compiled local variable table. Literals may themselves be nested bytecode units.
//!
//! # Key Components
//!
//! - [`Bytecode`] - One compiled unit with all of its tables
//! - [`Header`] / [`Version`] - The container preamble
//! - [`BytecodeParser`] - Decodes the textual container into these types
//! - [`Literal`], [`Local`], [`ExceptionRange`], [`AuxData`] - Table entries
//!
//! # Examples
//!
//! ```rust,no_run
//! use tclscope::TbcFile;
//! use std::path::Path;
//!
//! let file = TbcFile::from_file(Path::new("app.tbc"))?;
//! let bytecode = file.bytecode();
//! println!("{}", bytecode.header_string());
//! for literal in &bytecode.literals {
//!     println!("literal: {}", literal);
//! }
//! # Ok::<(), tclscope::Error>(())
//! ```

mod auxdata;
mod exception;
mod literal;
mod local;
mod parser;

pub use auxdata::{AuxData, AuxDataType, DictUpdateInfo, ForeachInfo, JumptableInfo};
pub use exception::{ExceptionRange, ExceptionType};
pub use literal::{Literal, LiteralType};
pub use local::{Local, LocalFlags};
pub use parser::{BytecodeParser, TCL_BYTECODE_MAGIC};

use std::fmt::{self, Write};

use strum::Display;

use crate::code::CodeRange;

/// Whether a unit is a plain script or a procedure body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum BytecodeKind {
    /// Top-level script or nested script literal
    #[default]
    Code,
    /// Procedure body, which additionally carries a local variable table
    Proc,
}

/// A `major.minor` version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Version {
    /// Major version
    pub major: i32,
    /// Minor version
    pub minor: i32,
}

impl Version {
    /// Creates a version from its parts.
    #[must_use]
    pub const fn new(major: i32, minor: i32) -> Self {
        Version { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The preamble of a `tbcload` container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// Container format revision
    pub format: i32,
    /// Compiler build number
    pub build: i32,
    /// Version of the TclPro compiler that wrote the file
    pub compiler_version: Version,
    /// Tcl version the bytecode targets
    pub tcl_version: Version,
}

/// The size fields that precede every bytecode unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub struct BytecodeInfo {
    pub num_commands: u32,
    pub num_src_bytes: u32,
    pub num_code_bytes: u32,
    pub num_lit_objects: u32,
    pub num_except_ranges: u32,
    pub num_aux_data_items: u32,
    pub num_cmd_loc_bytes: u32,
    pub max_except_depth: u32,
    pub max_stack_depth: u32,
    pub code_delta_size: u32,
    pub code_length_size: u32,
    pub src_delta_size: u32,
    pub src_length_size: u32,
}

/// A single compiled unit: a script or a procedure body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bytecode {
    /// Script or procedure body
    pub kind: BytecodeKind,
    /// Declared table sizes
    pub info: BytecodeInfo,
    /// Raw big-endian instruction stream
    pub code: Vec<u8>,
    /// Instruction range of each source command
    pub code_ranges: Vec<CodeRange>,
    /// Source text range of each source command
    pub source_ranges: Vec<CodeRange>,
    /// Literal pool indexed by `Lit1`/`Lit4` operands
    pub literals: Vec<Literal>,
    /// Loop and catch regions
    pub exception_ranges: Vec<ExceptionRange>,
    /// Auxiliary tables indexed by `Aux4` operands
    pub aux_data: Vec<AuxData>,
    /// Number of declared procedure arguments
    pub num_args: u32,
    /// Compiled locals indexed by `Lvt1`/`Lvt4` operands, empty for scripts
    pub locals: Vec<Local>,
}

impl Bytecode {
    /// Returns the innermost loop region that contains `location`.
    ///
    /// Regions are stored outermost first, so the last match is the innermost one.
    #[must_use]
    pub fn innermost_loop(&self, location: u32) -> Option<&ExceptionRange> {
        self.exception_ranges
            .iter()
            .rev()
            .find(|range| range.is_loop() && range.contains(location))
    }

    /// Returns the names of the procedure arguments, in declaration order.
    #[must_use]
    pub fn argument_names(&self) -> Vec<&str> {
        self.locals
            .iter()
            .filter(|local| local.is_argument())
            .map(|local| local.name.as_str())
            .collect()
    }

    /// One-line summary of the declared table sizes.
    #[must_use]
    pub fn header_string(&self) -> String {
        format!(
            "Cmds {}, src {}, code {}, lits {}, aux {}, stkDepth {}",
            self.info.num_commands,
            self.info.num_src_bytes,
            self.info.num_code_bytes,
            self.info.num_lit_objects,
            self.info.num_aux_data_items,
            self.info.max_stack_depth
        )
    }

    /// Table of the exception ranges, one per line. Empty if there are none.
    #[must_use]
    pub fn exception_info_string(&self) -> String {
        let mut out = String::new();
        if self.exception_ranges.is_empty() {
            return out;
        }

        let ranges = &self.exception_ranges;
        let index_width = ranges.len().to_string().len();
        let level_width = self.info.max_except_depth.to_string().len();
        let lower_width = column_width(ranges.iter().map(|r| r.code_offset));
        let upper_width = column_width(ranges.iter().map(|r| r.code_range().end()));
        let continue_width = column_width(ranges.iter().map(|r| r.continue_offset));
        let break_width = column_width(ranges.iter().map(|r| r.break_offset));
        let catch_width = column_width(ranges.iter().map(|r| r.catch_offset));

        let _ = writeln!(
            out,
            "Exception ranges {}, depth {}",
            self.exception_ranges.len(),
            self.info.max_except_depth
        );
        for (index, range) in self.exception_ranges.iter().enumerate() {
            let _ = writeln!(
                out,
                "    {:>index_width$}: level {:>level_width$}, {:>5}, \
                 pc {:>lower_width$}-{:<upper_width$}, continue {:>continue_width$}, \
                 break {:>break_width$}, catch {:>catch_width$}",
                index,
                range.nesting_level,
                range.kind.to_string(),
                range.code_offset,
                range.code_range().end(),
                range.continue_offset,
                range.break_offset,
                range.catch_offset,
            );
        }

        out
    }

    /// Instruction ranges of the source commands, four per line.
    #[must_use]
    pub fn command_info_string(&self) -> String {
        let mut out = String::new();
        let command_width = self.info.num_commands.to_string().len();
        let code_width = self.info.num_code_bytes.to_string().len();

        let _ = write!(out, "Commands {}:", self.info.num_commands);
        for (index, range) in self.code_ranges.iter().enumerate() {
            if index % 4 == 0 {
                out.push('\n');
            }
            let _ = write!(
                out,
                "    {:>command_width$}: pc {:>code_width$}-{:>code_width$}",
                index + 1,
                range.start,
                range.end()
            );
        }

        out
    }
}

/// Width of the widest rendered value, at least 1.
fn column_width<T: ToString>(values: impl Iterator<Item = T>) -> usize {
    values.map(|value| value.to_string().len()).max().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looped() -> Bytecode {
        let range = |kind, offset, length, level| ExceptionRange {
            kind,
            nesting_level: level,
            code_offset: offset,
            num_code_bytes: length,
            break_offset: 40,
            continue_offset: 12,
            catch_offset: -1,
        };

        Bytecode {
            kind: BytecodeKind::Code,
            info: BytecodeInfo {
                num_commands: 2,
                num_code_bytes: 42,
                max_except_depth: 2,
                ..Default::default()
            },
            code: Vec::new(),
            code_ranges: vec![CodeRange::new(0, 10), CodeRange::new(10, 32)],
            source_ranges: Vec::new(),
            literals: Vec::new(),
            exception_ranges: vec![
                range(ExceptionType::Loop, 0, 40, 0),
                range(ExceptionType::Catch, 5, 20, 1),
                range(ExceptionType::Loop, 8, 10, 1),
            ],
            aux_data: Vec::new(),
            num_args: 0,
            locals: Vec::new(),
        }
    }

    #[test]
    fn innermost_loop() {
        let bytecode = looped();

        assert_eq!(bytecode.innermost_loop(9).unwrap().code_offset, 8);
        assert_eq!(bytecode.innermost_loop(20).unwrap().code_offset, 0);
        assert!(bytecode.innermost_loop(40).is_none());
    }

    #[test]
    fn summaries() {
        let bytecode = looped();

        assert_eq!(
            bytecode.header_string(),
            "Cmds 2, src 0, code 42, lits 0, aux 0, stkDepth 0"
        );
        assert_eq!(
            bytecode.command_info_string(),
            "Commands 2:\n    1: pc  0-10    2: pc 10-42"
        );

        let exceptions = bytecode.exception_info_string();
        assert!(exceptions.starts_with("Exception ranges 3, depth 2\n"));
        assert!(exceptions.contains("1: level 1, Catch, pc 5-25, continue 12, break 40, catch -1"));
        assert_eq!(exceptions.lines().count(), 4);
    }

    #[test]
    fn version_display() {
        assert_eq!(Version::new(8, 6).to_string(), "8.6");
        assert!(Version::new(8, 4) < Version::new(8, 6));
    }
}
