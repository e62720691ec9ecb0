//! # Note File Writer
//!
//! Each note directory carries two fixed-name files:
//!
//! - `content.txt` — a plain-text rendering, so the tree stays readable in
//!   any file manager;
//! - `data.json` — the full record snapshot, pretty-printed. This is what
//!   the sync engine parses on the next scan, and what conflict
//!   resolution rewrites when the store wins.
//!
//! Writes here are best-effort: a note save must never fail because one
//! companion file could not be written. The two writes are independent —
//! either may land without the other.

use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::model::Note;

/// Plain-text rendering of the note content.
pub const PLAIN_TEXT_FILE: &str = "content.txt";

/// Full record snapshot.
pub const SNAPSHOT_FILE: &str = "data.json";

/// Write both companion files into a note directory. Each write failure is
/// logged and does not affect the other write or the caller.
pub fn write_note_files<F: FileSystem>(fs: &F, note_dir: &Path, note: &Note, plain_text: &str) {
    let txt_path = note_dir.join(PLAIN_TEXT_FILE);
    if let Err(e) = fs.write_text(&txt_path, plain_text) {
        warn!("Failed to write {}: {}", txt_path.display(), e);
    }

    if let Err(e) = write_snapshot(fs, note_dir, note) {
        warn!(
            "Failed to write snapshot in {}: {}",
            note_dir.display(),
            e
        );
    }
}

/// Serialize a record into the directory's snapshot file.
pub fn write_snapshot<F: FileSystem>(fs: &F, note_dir: &Path, note: &Note) -> Result<()> {
    let json = serde_json::to_string_pretty(note)?;
    fs.write_text(&note_dir.join(SNAPSHOT_FILE), &json)
}

/// Read and parse the directory's snapshot file.
///
/// `None` for absent, unreadable, or unparseable snapshots; the latter two
/// are logged. Callers synthesize a record in every `None` case.
pub fn read_snapshot<F: FileSystem>(fs: &F, note_dir: &Path) -> Option<Note> {
    let path = note_dir.join(SNAPSHOT_FILE);
    if !fs.exists(&path) {
        return None;
    }

    let raw = match fs.read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(note) => Some(note),
        Err(e) => {
            warn!("Malformed snapshot {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFileSystem;
    use crate::model::DEFAULT_CONTENT;
    use std::fs;
    use tempfile::TempDir;

    fn sample_note() -> Note {
        let mut note = Note::new("Sample".to_string());
        note.id = "123".to_string();
        note.updated_at = 1000;
        note
    }

    #[test]
    fn test_write_note_files_creates_both() {
        let tmp = TempDir::new().unwrap();
        let fs_impl = OsFileSystem::new();

        write_note_files(&fs_impl, tmp.path(), &sample_note(), "hello");

        assert_eq!(
            fs::read_to_string(tmp.path().join(PLAIN_TEXT_FILE)).unwrap(),
            "hello"
        );
        let snapshot = fs::read_to_string(tmp.path().join(SNAPSHOT_FILE)).unwrap();
        assert!(snapshot.contains("\"updatedAt\": 1000"));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let fs_impl = OsFileSystem::new();
        let note = sample_note();

        write_snapshot(&fs_impl, tmp.path(), &note).unwrap();
        let loaded = read_snapshot(&fs_impl, tmp.path()).unwrap();
        assert_eq!(loaded, note);
    }

    #[test]
    fn test_read_snapshot_absent() {
        let tmp = TempDir::new().unwrap();
        let fs_impl = OsFileSystem::new();
        assert!(read_snapshot(&fs_impl, tmp.path()).is_none());
    }

    #[test]
    fn test_read_snapshot_malformed() {
        let tmp = TempDir::new().unwrap();
        let fs_impl = OsFileSystem::new();
        fs::write(tmp.path().join(SNAPSHOT_FILE), "{not json").unwrap();
        assert!(read_snapshot(&fs_impl, tmp.path()).is_none());
    }

    #[test]
    fn test_read_snapshot_fills_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let fs_impl = OsFileSystem::new();
        fs::write(
            tmp.path().join(SNAPSHOT_FILE),
            r#"{"id":"9","title":"Bare","updatedAt":5}"#,
        )
        .unwrap();

        let note = read_snapshot(&fs_impl, tmp.path()).unwrap();
        assert_eq!(note.id, "9");
        assert_eq!(note.content, DEFAULT_CONTENT);
        assert!(!note.is_pinned);
    }

    #[test]
    fn test_writes_are_independent() {
        let tmp = TempDir::new().unwrap();
        let fs_impl = OsFileSystem::new();

        // Block the plain-text write by occupying its name with a directory.
        fs::create_dir(tmp.path().join(PLAIN_TEXT_FILE)).unwrap();

        write_note_files(&fs_impl, tmp.path(), &sample_note(), "hello");

        // The snapshot still landed.
        assert!(read_snapshot(&fs_impl, tmp.path()).is_some());
    }
}
