use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while loading `.tbc` files,
/// decoding bytecode containers, disassembling instructions and rewriting the code map during
/// structural recovery. Each variant provides specific context about the failure mode to enable
/// appropriate error handling.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Corrupted container, unknown opcode or broken operand
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::NotBytecode`] - The input carries no `tbcload::bceval` payload
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Code Map Invariant Violations
/// - [`Error::Conflict`] - A unit was inserted at an occupied location
/// - [`Error::Misaligned`] - A merge did not align to sub-unit boundaries
/// - [`Error::InvalidRange`] - A range was built from inverted bounds
/// - [`Error::Boundary`] - A unit was appended off a command's end boundary
///
/// Invariant violations point at a bug in a reduction pass, never at malformed input.
///
/// # Examples
///
/// ```rust,no_run
/// use tclscope::{Error, TbcFile};
/// use std::path::Path;
///
/// match TbcFile::from_file(Path::new("script.tbc")) {
///     Ok(file) => println!("Tcl {}", file.header().tcl_version),
///     Err(Error::NotBytecode) => eprintln!("not a tbcload script"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed bytecode: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The bytecode is damaged and could not be decoded.
    ///
    /// Raised for broken container fields, unknown opcode bytes, out-of-range literal
    /// references and illegal base-85 characters. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading a buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The input does not contain a `tbcload::bceval` block.
    #[error("Input does not contain tbcload bytecode")]
    NotBytecode,

    /// A unit was inserted at a location that is already occupied.
    #[error("Range conflicts with already existing code at location {0}")]
    Conflict(u32),

    /// A merge candidate does not start and end exactly on the boundaries of the units it covers.
    #[error("Merge must align to sub-unit boundaries ({start}..{end})")]
    Misaligned {
        /// Start of the proposed merge range
        start: u32,
        /// End of the proposed merge range
        end: u32,
    },

    /// A range was constructed with an end before its start.
    #[error("Invalid range bounds {start}..{end}")]
    InvalidRange {
        /// The requested start
        start: u32,
        /// The requested end
        end: u32,
    },

    /// A unit appended to a command does not start at the command's end.
    #[error("Unit at {found} does not fall on end boundary {expected}")]
    Boundary {
        /// The command's end location
        expected: u32,
        /// The location of the rejected unit
        found: u32,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
