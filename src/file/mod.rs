//! Loading of TclPro `.tbc` files.
//!
//! A `.tbc` file is an ordinary Tcl script that calls `tbcload::bceval` with the precompiled
//! bytecode as a braced argument:
//!
//! ```text
//! if {[catch {package require tbcload 1.4} err] == 1} { ... }
//! tbcload::bceval {
//! TclPro ByteCode 2 0 1.4 8.6
//! ...
//! }
//! ```
//!
//! [`TbcFile`] locates that payload, decodes its container header and top-level
//! [`crate::bytecode::Bytecode`] unit, and keeps the raw file data around for inspection.
//!
//! # Key Components
//!
//! - [`TbcFile`] - A loaded and decoded `.tbc` file
//! - [`Backend`] - Abstraction over the file data source
//! - [`crate::file::parser::Parser`] - Big-endian cursor over instruction bytes
//! - [`crate::file::reader::BytecodeReader`] - Token reader and base-85 codec for the payload
//! - [`crate::file::io`] - Low-level endian aware reads
//!
//! # Examples
//!
//! ```rust,no_run
//! use tclscope::TbcFile;
//! use std::path::Path;
//!
//! let file = TbcFile::from_file(Path::new("app.tbc"))?;
//! println!("compiled for Tcl {}", file.header().tcl_version);
//! println!("{}", file.bytecode().header_string());
//! # Ok::<(), tclscope::Error>(())
//! ```

pub mod io;
pub mod parser;
pub mod reader;

mod memory;
mod physical;

use std::path::Path;

use crate::{
    bytecode::{Bytecode, BytecodeParser, Header},
    Error::NotBytecode,
    Result,
};
use memory::Memory;
use physical::Physical;

/// The command whose argument carries the bytecode payload.
const BCEVAL_COMMAND: &str = "tbcload::bceval";

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of the file data, allowing for both in-memory and
/// on-disk representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded `.tbc` file.
///
/// # Examples
///
/// ```rust
/// use tclscope::TbcFile;
///
/// let text = "tbcload::bceval {\nTclPro ByteCode 2 0 1.4 8.6\n0 0 0 0 0 0 0 0 0 0 0 0 0\n0\n0\n0\n0\n}";
/// let file = TbcFile::from_text(text)?;
/// assert_eq!(file.header().compiler_version.to_string(), "1.4");
/// assert!(file.bytecode().code.is_empty());
/// # Ok::<(), tclscope::Error>(())
/// ```
pub struct TbcFile {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The decoded container header
    header: Header,
    /// The decoded top-level unit
    bytecode: Bytecode,
}

impl TbcFile {
    /// Loads a `.tbc` file from the given path.
    ///
    /// The file is memory-mapped for access.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be read,
    /// [`crate::Error::NotBytecode`] if it carries no `tbcload::bceval` payload and
    /// [`crate::Error::Malformed`] if the payload cannot be decoded.
    pub fn from_file(file: &Path) -> Result<TbcFile> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a `.tbc` file from a memory buffer.
    ///
    /// # Errors
    ///
    /// See [`TbcFile::from_file`].
    pub fn from_mem(data: Vec<u8>) -> Result<TbcFile> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Loads a `.tbc` file from its text.
    ///
    /// # Errors
    ///
    /// See [`TbcFile::from_file`].
    pub fn from_text(text: &str) -> Result<TbcFile> {
        Self::from_mem(text.as_bytes().to_vec())
    }

    fn load<T: Backend + 'static>(data: T) -> Result<TbcFile> {
        let data = Box::new(data);

        let text = std::str::from_utf8(data.data())
            .map_err(|error| malformed_error!("File is not valid text: {}", error))?;
        let payload = extract_payload(text)?;

        let mut parser = BytecodeParser::new(payload)?;
        let header = *parser.header();
        let bytecode = parser.parse()?;

        log::debug!(
            "loaded tbc payload: compiler {}, tcl {}, {} code bytes",
            header.compiler_version,
            header.tcl_version,
            bytecode.code.len()
        );

        Ok(TbcFile {
            data,
            header,
            bytecode,
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the loaded file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the raw file data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a bounds-checked slice of the raw file data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Returns the container header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the top-level bytecode unit.
    #[must_use]
    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }
}

/// Locates the payload of the `tbcload::bceval` call.
///
/// The payload starts after the last `{` on the line of the command and runs up to the next
/// `}`. The base-85 alphabet never contains braces.
///
/// # Errors
///
/// Returns [`crate::Error::NotBytecode`] if no such block exists.
pub fn extract_payload(text: &str) -> Result<&str> {
    let Some(command) = text.find(BCEVAL_COMMAND) else {
        return Err(NotBytecode);
    };

    let rest = &text[command + BCEVAL_COMMAND.len()..];
    let line = rest.split(['\n', '\r']).next().unwrap_or_default();
    let Some(open) = line.rfind('{') else {
        return Err(NotBytecode);
    };

    let body = &rest[open + 1..];
    let close = body.find('}').ok_or(NotBytecode)?;

    Ok(body[..close].trim())
}
