//! Construction options for the local backend.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default permission bits for new files (`rw-r--r--`).
pub const DEFAULT_FILE_PERM: u32 = 0o644;

/// Default permission bits for new directories (`rwxr-xr-x`).
pub const DEFAULT_DIR_PERM: u32 = 0o755;

/// Only permission bits are honoured; type and setuid/sticky bits are masked.
const PERM_MASK: u32 = 0o777;

/// Options for [`LocalFilestore`](crate::LocalFilestore).
///
/// Can be built in code:
///
/// ```
/// use filestore_core::LocalConfig;
///
/// let config = LocalConfig::default()
///     .with_root("/srv/files")
///     .with_file_perm(0o600);
/// assert_eq!(config.file_perm, 0o600);
/// ```
///
/// or loaded from TOML:
///
/// ```toml
/// root = "/srv/files"
/// file_perm = 0o640
/// dir_perm = 0o750
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalConfig {
    /// Store root. The working directory is used when unset.
    pub root: Option<PathBuf>,
    /// Permission bits for new files.
    pub file_perm: u32,
    /// Permission bits for new directories.
    pub dir_perm: u32,
    /// fsync new content before it replaces the destination.
    pub sync_on_insert: bool,
    /// Reject paths whose `..` segments climb above the root.
    pub confine_paths: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: None,
            file_perm: DEFAULT_FILE_PERM,
            dir_perm: DEFAULT_DIR_PERM,
            sync_on_insert: true,
            confine_paths: false,
        }
    }
}

impl LocalConfig {
    /// Set the store root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the permission bits for new files.
    pub fn with_file_perm(mut self, perm: u32) -> Self {
        self.file_perm = perm;
        self
    }

    /// Set the permission bits for new directories.
    pub fn with_dir_perm(mut self, perm: u32) -> Self {
        self.dir_perm = perm;
        self
    }

    /// Enable or disable fsync before the final rename.
    pub fn with_sync_on_insert(mut self, sync: bool) -> Self {
        self.sync_on_insert = sync;
        self
    }

    /// Enable or disable rejection of paths that escape the root.
    pub fn with_confine_paths(mut self, confine: bool) -> Self {
        self.confine_paths = confine;
        self
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub(crate) fn file_mode(&self) -> u32 {
        self.file_perm & PERM_MASK
    }

    pub(crate) fn dir_mode(&self) -> u32 {
        self.dir_perm & PERM_MASK
    }
}
