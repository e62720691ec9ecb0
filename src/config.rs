//! # Configuration
//!
//! The vault is configured with a [`confique`]-derived struct. The library
//! only defines the shape and the resolution rules; the host application
//! decides where to load it from (TOML file, environment, or programmatic
//! overrides).
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `storage_root` | user documents dir + `MemoVault` | Root of the note directory tree |
//! | `records_dir` | `.store` | Record-store directory, joined under the root unless absolute |
//!
//! The default `records_dir` is dot-named on purpose: the sync scan skips
//! hidden entries, so the store files never show up as a category.

use std::path::{Path, PathBuf};

use confique::Config;
use directories::UserDirs;
use serde::{Deserialize, Serialize};

const DEFAULT_DIR_NAME: &str = "MemoVault";

/// Configuration for a vault, typically stored in `memovault.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Absolute path of the storage root. When unset, falls back to
    /// `<documents dir>/MemoVault`.
    pub storage_root: Option<PathBuf>,

    /// Directory holding the persisted record collections. Relative paths
    /// are joined under the storage root.
    #[config(default = ".store")]
    pub records_dir: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            storage_root: None,
            records_dir: PathBuf::from(".store"),
        }
    }
}

impl VaultConfig {
    /// The storage root this configuration resolves to.
    pub fn resolve_root(&self) -> PathBuf {
        self.storage_root.clone().unwrap_or_else(default_root)
    }

    /// The record-store directory, resolved against the storage root.
    pub fn resolve_records_dir(&self) -> PathBuf {
        if self.records_dir.is_absolute() {
            self.records_dir.clone()
        } else {
            self.resolve_root().join(&self.records_dir)
        }
    }
}

/// Platform default root: the user's documents directory, falling back to
/// `~/Documents`, then the current directory.
fn default_root() -> PathBuf {
    if let Some(dirs) = UserDirs::new() {
        if let Some(docs) = dirs.document_dir() {
            return docs.join(DEFAULT_DIR_NAME);
        }
        return dirs.home_dir().join("Documents").join(DEFAULT_DIR_NAME);
    }
    Path::new(".").join(DEFAULT_DIR_NAME)
}
