//! Read-only handles onto stored objects.

use crate::error::Result;
use std::fmt;
use std::io::{self, Read};

/// An open, read-only, sequential view of a stored object.
///
/// The handle is owned by the caller. It is released either by calling
/// [`StoredFile::close`] or by dropping it, so early returns never leak the
/// underlying descriptor.
pub struct StoredFile {
    path: String,
    size: Option<u64>,
    reader: Box<dyn Read + Send>,
}

impl StoredFile {
    /// Wrap a backend reader as a handle for `path`.
    pub fn new(path: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            path: path.into(),
            size: None,
            reader: Box::new(reader),
        }
    }

    /// Like [`StoredFile::new`], recording the content length observed when
    /// the file was opened.
    pub fn with_size(path: impl Into<String>, reader: impl Read + Send + 'static, size: u64) -> Self {
        Self {
            size: Some(size),
            ..Self::new(path, reader)
        }
    }

    /// Content length at open time, if the backend knows it.
    ///
    /// Stays fixed for the life of the handle, even if the path is
    /// overwritten meanwhile.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// The store-relative path this handle was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read the remaining content into a vector.
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Release the handle.
    pub fn close(self) -> Result<()> {
        drop(self.reader);
        Ok(())
    }
}

impl Read for StoredFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredFile")
            .field("path", &self.path)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
