//! The store interface every backend implements.

use crate::context::Context;
use crate::error::Result;
use crate::file::StoredFile;
use std::io::Read;

/// A namespace of files addressed by paths relative to the store root.
///
/// All operations are blocking. Implementations hold no per-call state, so a
/// single store may be shared between threads.
pub trait Filestore: Send + Sync {
    /// Open the file at `path` for reading.
    ///
    /// Returns `Error::FileNotFound` if `path` does not name a regular file,
    /// including when it names a directory.
    fn get(&self, ctx: &Context, path: &str) -> Result<StoredFile>;

    /// Store everything `src` yields at `dest`, replacing any existing file.
    ///
    /// Missing parent directories are created. Readers never observe a
    /// partially written file, and on failure `dest` is left as it was.
    fn insert(&self, ctx: &Context, src: &mut dyn Read, dest: &str) -> Result<()>;

    /// Permanently delete the file at `path`.
    ///
    /// Returns `Error::FileNotFound` if `path` does not exist.
    fn remove(&self, ctx: &Context, path: &str) -> Result<()>;

    /// Release backend-wide resources.
    fn close(&self) -> Result<()>;

    /// Store an in-memory buffer at `dest`.
    fn insert_bytes(&self, ctx: &Context, data: &[u8], dest: &str) -> Result<()> {
        let mut src = data;
        self.insert(ctx, &mut src, dest)
    }

    /// Read the whole file at `path`.
    fn read(&self, ctx: &Context, path: &str) -> Result<Vec<u8>> {
        let mut file = self.get(ctx, path)?;
        let data = file.read_to_vec()?;
        file.close()?;
        Ok(data)
    }
}
