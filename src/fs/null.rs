use std::io;
use std::path::Path;

use super::{DirEntry, FileSystem};
use crate::error::Result;

/// No-op adapter for hosts without filesystem access.
///
/// Nothing exists, listings are empty, reads fail as not-found, and every
/// mutation silently succeeds. Paired with an in-memory record store this
/// lets the vault run without touching disk at all.
#[derive(Debug, Default)]
pub struct NullFileSystem;

impl NullFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for NullFileSystem {
    fn exists(&self, _path: &Path) -> bool {
        false
    }

    fn create_dir_all(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn read_dir(&self, _path: &Path) -> Result<Vec<DirEntry>> {
        Ok(Vec::new())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no file system behind {}", path.display()),
        )
        .into())
    }

    fn write_text(&self, _path: &Path, _contents: &str) -> Result<()> {
        Ok(())
    }

    fn write_binary(&self, _path: &Path, _contents: &[u8]) -> Result<()> {
        Ok(())
    }

    fn rename(&self, _from: &Path, _to: &Path) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}
