//! Filestore backed by a directory on the local filesystem.

use crate::config::LocalConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::file::StoredFile;
use crate::filestore::Filestore;
use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Prefix of the temporary files written next to an insert's destination.
pub const TEMP_PREFIX: &str = ".tmp_";

/// A filestore rooted at a local directory.
///
/// Paths are resolved by lexically joining them onto the root. Unless
/// `confine_paths` is set, a path such as `../x` is trusted and resolves
/// outside the root; callers passing untrusted paths should enable it.
#[derive(Debug, Clone)]
pub struct LocalFilestore {
    root: PathBuf,
    config: LocalConfig,
}

impl LocalFilestore {
    /// Create a store from `config`, falling back to the process working
    /// directory when no root is configured.
    pub fn new(config: LocalConfig) -> Result<Self> {
        Self::with_cwd(config, env::current_dir)
    }

    /// Open a store rooted at `root` with default options.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::new(LocalConfig::default().with_root(root.as_ref()))
    }

    /// Create a store from `config`, using `cwd` to supply the working
    /// directory. `cwd` is called only if the root is unset or relative.
    pub fn with_cwd<F>(config: LocalConfig, cwd: F) -> Result<Self>
    where
        F: FnOnce() -> io::Result<PathBuf>,
    {
        let root = match config.root.as_deref() {
            Some(root) if root.is_absolute() => root.to_path_buf(),
            Some(root) if !root.as_os_str().is_empty() => working_dir(cwd)?.join(root),
            _ => working_dir(cwd)?,
        };
        let root = clean(&root);

        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(Error::invalid_root(&root, "not a directory")),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::invalid_root(&root, "directory does not exist"));
            }
            Err(e) => return Err(Error::invalid_root(&root, e.to_string())),
        }

        debug!(root = %root.display(), "opened local filestore");

        Ok(Self { root, config })
    }

    /// Get the root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the options the store was created with.
    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    /// Permission bits applied to new files.
    pub fn file_perm(&self) -> u32 {
        self.config.file_mode()
    }

    /// Permission bits applied to new directories.
    pub fn dir_perm(&self) -> u32 {
        self.config.dir_mode()
    }

    /// Resolve a store-relative path to its absolute location.
    ///
    /// Leading separators are ignored, `.` and empty segments collapse, and
    /// `..` removes the previous segment. With `confine_paths` set, a `..`
    /// that would leave the root is an error.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        let mut depth = 0usize;

        for component in Path::new(path).components() {
            match component {
                Component::Normal(segment) => {
                    resolved.push(segment);
                    depth += 1;
                }
                Component::ParentDir if depth > 0 => {
                    resolved.pop();
                    depth -= 1;
                }
                Component::ParentDir => {
                    if self.config.confine_paths {
                        return Err(Error::path_escapes_root(path));
                    }
                    resolved.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        Ok(resolved)
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.dir_perm());
        }
        builder.create(dir)?;
        Ok(())
    }
}

impl Filestore for LocalFilestore {
    fn get(&self, ctx: &Context, path: &str) -> Result<StoredFile> {
        ctx.check()?;
        let abs = self.resolve(path)?;

        let file = File::open(&abs).map_err(|e| open_error(&abs, path, e))?;

        // Unix opens directories for reading; they are still not files here.
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            return Err(Error::file_not_found(path));
        }

        debug!(path = %path, "opened file");
        Ok(StoredFile::with_size(path, file, metadata.len()))
    }

    fn insert(&self, ctx: &Context, src: &mut dyn Read, dest: &str) -> Result<()> {
        ctx.check()?;
        let dest_abs = self.resolve(dest)?;
        if dest_abs == self.root {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination is the store root",
            )
            .into());
        }
        let dest_dir = dest_abs.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("destination has no parent directory: {}", dest_abs.display()),
            )
        })?;
        self.create_dir_all(dest_dir)?;

        // The temporary file must live in the destination's directory so the
        // final rename never crosses a device boundary. It is deleted on drop,
        // which covers every early return below.
        let temp_file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dest_dir)?;
        set_file_mode(temp_file.as_file(), self.file_perm())?;

        let mut writer = BufWriter::new(temp_file);
        let written = io::copy(src, &mut writer)?;
        let temp_file = writer.into_inner().map_err(|e| e.into_error())?;

        if self.config.sync_on_insert {
            temp_file.as_file().sync_all()?;
        }

        temp_file.persist(&dest_abs)?;

        debug!(path = %dest, bytes = written, "inserted file");
        Ok(())
    }

    fn remove(&self, ctx: &Context, path: &str) -> Result<()> {
        ctx.check()?;
        let abs = self.resolve(path)?;

        match fs::remove_file(&abs) {
            Ok(()) => {
                debug!(path = %path, "removed file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::file_not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Classify a failed open. Windows refuses to open directories with
/// `PermissionDenied`, so a directory target is reported as not found.
fn open_error(abs: &Path, path: &str, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        return Error::file_not_found(path);
    }
    if fs::metadata(abs).is_ok_and(|m| m.is_dir()) {
        return Error::file_not_found(path);
    }
    err.into()
}

/// Call `cwd`, reporting failure as a root error.
fn working_dir<F>(cwd: F) -> Result<PathBuf>
where
    F: FnOnce() -> io::Result<PathBuf>,
{
    cwd().map_err(|e| {
        Error::invalid_root(
            PathBuf::new(),
            format!("couldn't determine working directory: {}", e),
        )
    })
}

/// Lexically normalise an absolute path: drop `.` and fold `..`.
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Set file mode (permissions) on an open file.
#[cfg(unix)]
fn set_file_mode(file: &File, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))?;
    Ok(())
}

/// Set file mode (Windows no-op).
#[cfg(not(unix))]
fn set_file_mode(_file: &File, _mode: u32) -> Result<()> {
    Ok(())
}
