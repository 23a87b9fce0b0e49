//! Cursor over instruction bytes.
//!
//! [`Parser`] walks a decoded code array or one of the command-location tables of a bytecode
//! unit. Every read is bounds checked and advances the cursor; a failed read leaves the
//! cursor where it was.
//!
//! # Examples
//!
//! ```rust
//! use tclscope::Parser;
//!
//! // push1 3; jump1 -2
//! let code = [0x01, 0x03, 0x22, 0xFE];
//! let mut parser = Parser::new(&code);
//!
//! assert_eq!(parser.read_be::<u8>()?, 0x01);
//! assert_eq!(parser.read_be::<u8>()?, 0x03);
//! parser.advance()?;
//! assert_eq!(parser.read_be::<i8>()?, -2);
//! assert!(!parser.has_more_data());
//! # Ok::<(), tclscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, TclIO},
    Result,
};

/// Marker byte that escapes a 4-byte value in the command-location tables.
const ESCAPE_BYTE: u8 = 0xFF;

/// A big-endian byte cursor.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned at the first byte of `data`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tclscope::Parser;
    /// let parser = Parser::new(&[0x01, 0x02, 0x03, 0x04]);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is data left to read.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Current offset, which is the location of the next instruction while decoding code.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Skips one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn advance(&mut self) -> Result<()> {
        if !self.has_more_data() {
            return Err(out_of_bounds_error!());
        }

        self.position += 1;
        Ok(())
    }

    /// Reads a big-endian `T` and advances past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tclscope::Parser;
    ///
    /// let mut parser = Parser::new(&[0x00, 0x00, 0x01, 0x00]);
    /// let value: u32 = parser.read_be()?;
    /// assert_eq!(value, 256);
    /// assert_eq!(parser.pos(), 4);
    /// # Ok::<(), tclscope::Error>(())
    /// ```
    pub fn read_be<T: TclIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Reads one entry of a command-location delta or length table.
    ///
    /// Entries are a single unsigned byte, unless that byte is `0xFF`, in which case a
    /// big-endian `i32` follows and holds the value.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the table is truncated. The cursor is restored
    /// to the start of the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tclscope::Parser;
    /// let data = [0x05, 0xFF, 0x00, 0x00, 0x01, 0x00];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_escaped_int()?, 5);
    /// assert_eq!(parser.read_escaped_int()?, 256);
    /// # Ok::<(), tclscope::Error>(())
    /// ```
    pub fn read_escaped_int(&mut self) -> Result<i32> {
        let start = self.position;
        let byte = self.read_be::<u8>()?;
        if byte != ESCAPE_BYTE {
            return Ok(i32::from(byte));
        }

        self.read_be::<i32>().inspect_err(|_| self.position = start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn advance() {
        let mut parser = Parser::new(&[0x01, 0x02]);

        parser.advance().unwrap();
        parser.advance().unwrap();
        assert_eq!(parser.pos(), 2);
        assert!(matches!(parser.advance(), Err(Error::OutOfBounds)));
        assert_eq!(parser.pos(), 2);
    }

    #[test]
    fn escaped_ints() {
        let data = [0x00, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_escaped_int().unwrap(), 0);
        assert_eq!(parser.read_escaped_int().unwrap(), 254);
        assert_eq!(parser.read_escaped_int().unwrap(), -1);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn truncated_escape() {
        let mut parser = Parser::new(&[0xFF, 0x00]);

        assert!(parser.read_escaped_int().is_err());
        assert_eq!(parser.pos(), 0);
    }
}
