//! Big-endian reads of instruction operands.
//!
//! Tcl stores multi-byte operands and escaped command-location entries most significant byte
//! first. [`read_be_at`] reads one such value at a moving offset; the [`TclIO`] trait lists
//! the operand widths that exist in the instruction set.
//!
//! # Examples
//!
//! ```rust
//! use tclscope::file::io::read_be_at;
//!
//! // `jump4 +12` operand
//! let data = [0x00, 0x00, 0x00, 0x0C];
//! let mut offset = 0;
//! let target: i32 = read_be_at(&data, &mut offset)?;
//! assert_eq!(target, 12);
//! assert_eq!(offset, 4);
//! # Ok::<(), tclscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// An operand width that can be decoded from big-endian bytes.
pub trait TclIO: Sized {
    /// The fixed-size byte array holding one value.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decodes the value from its big-endian bytes.
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_tcl_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl TclIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

// One and four byte operands, signed and unsigned
impl_tcl_io!(u8 => 1, i8 => 1, u32 => 4, i32 => 4);

/// Reads a big-endian value of type `T` at `offset` and advances `offset` past it.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain. The offset
/// is left untouched in that case.
pub fn read_be_at<T: TclIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let end = offset
        .checked_add(std::mem::size_of::<T>())
        .ok_or(OutOfBounds)?;
    let bytes = data.get(*offset..end).ok_or(OutOfBounds)?;

    let Ok(read) = bytes.try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_be_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPERANDS: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFE];

    #[test]
    fn unsigned_word() {
        let mut offset = 0;
        assert_eq!(read_be_at::<u32>(&OPERANDS, &mut offset).unwrap(), 0x0102_0304);
        assert_eq!(offset, 4);
    }

    #[test]
    fn negative_offsets() {
        let mut offset = 4;
        assert_eq!(read_be_at::<i32>(&OPERANDS, &mut offset).unwrap(), -2);

        let mut offset = 7;
        assert_eq!(read_be_at::<i8>(&OPERANDS, &mut offset).unwrap(), -2);
    }

    #[test]
    fn truncated() {
        let data = [0xFF, 0xFF];

        let mut offset = 0;
        assert!(matches!(read_be_at::<u32>(&data, &mut offset), Err(OutOfBounds)));
        assert_eq!(offset, 0);

        let mut offset = 2;
        assert!(matches!(read_be_at::<u8>(&data, &mut offset), Err(OutOfBounds)));
        assert_eq!(offset, 2);
    }
}
