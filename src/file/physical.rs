//! Memory-mapped file backend.
//!
//! [`Physical`] maps a `.tbc` file read-only into the address space, so loading a large
//! archive of precompiled scripts does not copy it onto the heap first.

use super::Backend;
use crate::{
    Error::{Error, FileError},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O to access a file on disk.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical file backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the file on disk
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        // The mapping is read-only and the file handle stays owned by the map
        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(Error(error.to_string())),
        };

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if offset_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn physical() {
        let temp_path = std::env::temp_dir().join("tclscope_physical_test.tbc");
        std::fs::write(&temp_path, b"TclPro ByteCode 2 0 1.4 8.6").unwrap();

        let physical = Physical::new(&temp_path).unwrap();
        assert_eq!(physical.len(), 27);
        assert_eq!(physical.data_slice(0, 6).unwrap(), b"TclPro");
        assert!(physical.data_slice(usize::MAX, 1).is_err());
        assert!(physical.data_slice(20, 8).is_err());

        std::fs::remove_file(&temp_path).unwrap();
    }

    #[test]
    fn invalid_file_path() {
        let result = Physical::new(PathBuf::from("/nonexistent/path/to/file.tbc"));
        match result.unwrap_err() {
            FileError(io_error) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }
}
