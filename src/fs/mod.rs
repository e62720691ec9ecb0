//! # File System Adapter
//!
//! The storage root is a plain directory tree the user may also touch with
//! their own file manager. Everything the engine does to that tree goes
//! through the [`FileSystem`] trait so the rest of the crate never cares
//! which backend is underneath.
//!
//! Two implementations ship:
//!
//! - [`os::OsFileSystem`] — the production backend, a thin `std::fs`
//!   wrapper with a few listing/removal normalizations (see the trait
//!   method docs).
//! - [`null::NullFileSystem`] — a no-op for hosts without filesystem
//!   access. Queries come back empty, mutations silently succeed, and
//!   [`FileSystem::is_available`] reports `false` so the sync engine knows
//!   an empty listing means "no filesystem" rather than "empty tree".
//!
//! Contract: no internal retries. Every failure surfaces to the caller,
//! which treats it as non-fatal where possible, because the tree may
//! reflect a prior partial failure or a manual edit.

use std::path::{Path, PathBuf};

use crate::error::Result;

pub mod null;
pub mod os;

pub use null::NullFileSystem;
pub use os::OsFileSystem;

/// A single entry from a directory listing, normalized across backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Abstract interface for raw filesystem I/O.
pub trait FileSystem {
    /// Check whether a path exists. Never fails; an unanswerable probe
    /// counts as absent.
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// List a directory's immediate children, sorted by name so scans are
    /// deterministic.
    /// Returns an empty listing for a missing path; listing a file is an
    /// error.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write a whole text file, full overwrite.
    fn write_text(&self, path: &Path, contents: &str) -> Result<()>;

    /// Write a whole binary file, full overwrite.
    fn write_binary(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Rename/move a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a file, or a directory recursively. Removing a missing path
    /// succeeds.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Whether a real filesystem backs this adapter. When `false` the sync
    /// engine leaves the record store alone instead of pruning it against
    /// an empty tree.
    fn is_available(&self) -> bool;
}
