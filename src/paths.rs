//! # Naming Convention and Note Lookup
//!
//! A note's directory is named `<sanitized title>_<id>`. The embedded id
//! is what keeps identity stable while the human-readable title half gets
//! renamed; any directory whose name doesn't parse is foreign and gets
//! imported (and stamped) by the sync engine.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::fs::FileSystem;

/// Reserved top-level directory for notes with no folder.
pub const UNCATEGORIZED_DIR: &str = "Uncategorized";

/// Reserved top-level directory holding soft-deleted notes and categories.
pub const TRASH_DIR: &str = "Trash";

/// Replace characters unsafe in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.replace(['\\', '/', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// Directory name for a note: `<sanitized title>_<id>`.
pub fn note_dir_name(title: &str, id: &str) -> String {
    format!("{}_{}", sanitize_file_name(title), id)
}

/// Parse a `<title>_<digits>` directory name back into `(title, id)`.
///
/// The segment after the last underscore must be one or more decimal
/// digits; the title may be empty. Note the convention is ambiguous for a
/// title that itself ends in `_<digits>` — the trailing digits always read
/// as the id.
pub fn split_note_dir_name(name: &str) -> Option<(&str, &str)> {
    let (title, id) = name.rsplit_once('_')?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((title, id))
}

/// Locates note directories under the storage root.
pub struct PathResolver<'a, F: FileSystem> {
    fs: &'a F,
    root: &'a Path,
}

impl<'a, F: FileSystem> PathResolver<'a, F> {
    pub fn new(fs: &'a F, root: &'a Path) -> Self {
        Self { fs, root }
    }

    /// Find the directory of a note anywhere under the root: in every
    /// category, and one level deeper inside `Trash`, where trashed
    /// categories keep their own note directories.
    ///
    /// `None` means the note currently has no on-disk artifact; callers
    /// treat that as a state, not an error. Unreadable directories are
    /// logged and searched past.
    pub fn find_note_dir(&self, note_id: &str) -> Option<PathBuf> {
        let suffix = format!("_{note_id}");

        let categories = match self.fs.read_dir(self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Note lookup failed to list {}: {}", self.root.display(), e);
                return None;
            }
        };

        for cat in categories.iter().filter(|e| e.is_dir) {
            if let Some(found) = self.check_dir(&cat.path, &suffix) {
                return Some(found);
            }

            if cat.name == TRASH_DIR {
                let trashed = match self.fs.read_dir(&cat.path) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!("Note lookup failed to list {}: {}", cat.path.display(), e);
                        continue;
                    }
                };
                for entry in trashed.iter().filter(|e| e.is_dir) {
                    if let Some(found) = self.check_dir(&entry.path, &suffix) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    fn check_dir(&self, dir: &Path, suffix: &str) -> Option<PathBuf> {
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Note lookup skipped unreadable {}: {}", dir.display(), e);
                return None;
            }
        };
        entries
            .into_iter()
            .find(|e| e.name.ends_with(suffix))
            .map(|e| e.path)
    }
}
