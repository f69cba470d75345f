//! I/O utilities for reading data files.

use std::fs::File;
use std::io::ErrorKind;
#[cfg(not(feature = "mmap"))]
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use crate::error::DataError;

/// Classifies I/O errors into [`DataError`] variants with context.
pub fn classify_io_error(error: std::io::Error, context: &str) -> DataError {
    match error.kind() {
        ErrorKind::NotFound => DataError::IoError(format!("{}: file not found", context)),
        ErrorKind::UnexpectedEof => DataError::Truncated {
            table: context.to_string(),
            context: error.to_string(),
        },
        _ => DataError::IoError(format!("{}: {}", context, error)),
    }
}

/// Contents of a data file, either read into memory or memory mapped.
pub enum FileBytes {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Owned(bytes) => bytes,
            #[cfg(feature = "mmap")]
            FileBytes::Mapped(mmap) => mmap,
        }
    }
}

/// Reads a whole data file into memory.
#[cfg(not(feature = "mmap"))]
pub fn read_file(path: &Path) -> Result<FileBytes, DataError> {
    let context = path.display().to_string();
    let mut file = File::open(path).map_err(|e| classify_io_error(e, &context))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|e| classify_io_error(e, &context))?;
    Ok(FileBytes::Owned(data))
}

/// Memory maps a whole data file.
#[cfg(feature = "mmap")]
pub fn read_file(path: &Path) -> Result<FileBytes, DataError> {
    let context = path.display().to_string();
    let file = File::open(path).map_err(|e| classify_io_error(e, &context))?;
    // SAFETY: data files are treated as read-only for the lifetime of the mapping;
    // the loader parses and copies every row before the mapping is dropped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| classify_io_error(e, &context))?;
    Ok(FileBytes::Mapped(mmap))
}
