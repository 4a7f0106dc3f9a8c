//! # Filestore Core
//!
//! A file store addressed by relative paths, with a crash-safe local
//! backend.
//!
//! Callers work against the [`Filestore`] trait. [`LocalFilestore`] keeps
//! every stored path as a regular file at the same relative location under
//! its root directory and replaces files atomically: new content is written
//! to a temporary file next to the destination and renamed over it, so
//! readers see either the old file or the new one, never a mix.
//!
//! ## Example
//!
//! ```no_run
//! use filestore_core::{Context, Filestore, LocalConfig, LocalFilestore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalFilestore::new(LocalConfig::default().with_root("./files"))?;
//! let ctx = Context::background();
//!
//! store.insert(&ctx, &mut "hello".as_bytes(), "greetings/en.txt")?;
//!
//! let mut file = store.get(&ctx, "greetings/en.txt")?;
//! let content = file.read_to_vec()?;
//! file.close()?;
//! assert_eq!(content, b"hello");
//!
//! match store.remove(&ctx, "greetings/fr.txt") {
//!     Err(e) if e.is_not_found() => println!("nothing to remove"),
//!     other => other?,
//! }
//! store.close()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod error;
mod file;
mod filestore;
mod local;

pub use config::{DEFAULT_DIR_PERM, DEFAULT_FILE_PERM, LocalConfig};
pub use context::{CancelHandle, Context};
pub use error::{Error, Result};
pub use file::StoredFile;
pub use filestore::Filestore;
pub use local::{LocalFilestore, TEMP_PREFIX};
