use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RecordStore;
use crate::error::Result;
use crate::model::{next_unique_millis, Folder, Note};

const NOTES_FILE: &str = "notes.json";
const FOLDERS_FILE: &str = "folders.json";

/// File-backed record store.
///
/// Both collections live in memory as id-ordered maps and are written out
/// whole on every mutation. Writes go to a dot-named temp file first and
/// rename into place, so a crash mid-write leaves the previous file
/// intact.
pub struct JsonStore {
    dir: PathBuf,
    notes: BTreeMap<String, Note>,
    folders: BTreeMap<String, Folder>,
}

impl JsonStore {
    /// Open a store directory, creating it if needed, and materialize both
    /// collections. Missing files load as empty collections.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let notes = load_collection(&dir.join(NOTES_FILE))?;
        let folders = load_collection(&dir.join(FOLDERS_FILE))?;
        Ok(Self {
            dir,
            notes,
            folders,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn flush_notes(&self) -> Result<()> {
        save_collection(&self.dir, NOTES_FILE, &self.notes)
    }

    fn flush_folders(&self) -> Result<()> {
        save_collection(&self.dir, FOLDERS_FILE, &self.folders)
    }
}

fn load_collection<T: DeserializeOwned>(file: &Path) -> Result<BTreeMap<String, T>> {
    if !file.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_collection<T: Serialize>(dir: &Path, name: &str, map: &BTreeMap<String, T>) -> Result<()> {
    let content = serde_json::to_string_pretty(map)?;

    // Atomic write
    let tmp_file = dir.join(format!(".{}-{}.tmp", name, next_unique_millis()));
    fs::write(&tmp_file, content)?;
    fs::rename(&tmp_file, dir.join(name))?;

    Ok(())
}

impl RecordStore for JsonStore {
    fn notes(&self) -> Result<Vec<Note>> {
        Ok(self.notes.values().cloned().collect())
    }

    fn note(&self, id: &str) -> Result<Option<Note>> {
        Ok(self.notes.get(id).cloned())
    }

    fn put_note(&mut self, note: &Note) -> Result<()> {
        self.notes.insert(note.id.clone(), note.clone());
        self.flush_notes()
    }

    fn delete_note(&mut self, id: &str) -> Result<()> {
        if self.notes.remove(id).is_some() {
            self.flush_notes()?;
        }
        Ok(())
    }

    fn folders(&self) -> Result<Vec<Folder>> {
        Ok(self.folders.values().cloned().collect())
    }

    fn folder(&self, id: &str) -> Result<Option<Folder>> {
        Ok(self.folders.get(id).cloned())
    }

    fn put_folder(&mut self, folder: &Folder) -> Result<()> {
        self.folders.insert(folder.id.clone(), folder.clone());
        self.flush_folders()
    }

    fn delete_folder(&mut self, id: &str) -> Result<()> {
        if self.folders.remove(id).is_some() {
            self.flush_folders()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn note(id: &str, title: &str) -> Note {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            updated_at: 0,
            ..Note::new(String::new())
        }
    }

    #[test]
    fn test_open_creates_dir_and_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".store");
        let store = JsonStore::open(&dir).unwrap();

        assert!(dir.is_dir());
        assert!(store.notes().unwrap().is_empty());
        assert!(store.folders().unwrap().is_empty());
    }

    #[test]
    fn test_records_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".store");

        let mut store = JsonStore::open(&dir).unwrap();
        store.put_note(&note("2", "second")).unwrap();
        store.put_note(&note("1", "first")).unwrap();
        store
            .put_folder(&Folder {
                id: "f1".to_string(),
                name: "Work".to_string(),
                is_deleted: false,
            })
            .unwrap();
        drop(store);

        let store = JsonStore::open(&dir).unwrap();
        let notes = store.notes().unwrap();
        assert_eq!(notes.len(), 2);
        // Id order, not insertion order.
        assert_eq!(notes[0].id, "1");
        assert_eq!(notes[1].id, "2");
        assert_eq!(store.folder("f1").unwrap().unwrap().name, "Work");
    }

    #[test]
    fn test_put_replaces_whole_record() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonStore::open(tmp.path().join(".store")).unwrap();

        let mut n = note("1", "before");
        n.tags = vec!["keep".to_string()];
        store.put_note(&n).unwrap();

        let replacement = note("1", "after");
        store.put_note(&replacement).unwrap();

        let loaded = store.note("1").unwrap().unwrap();
        assert_eq!(loaded.title, "after");
        assert!(loaded.tags.is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonStore::open(tmp.path().join(".store")).unwrap();

        store.put_note(&note("1", "x")).unwrap();
        store.delete_note("1").unwrap();
        store.delete_note("1").unwrap();
        store.delete_note("never-existed").unwrap();
        store.delete_folder("never-existed").unwrap();

        assert!(store.note("1").unwrap().is_none());
    }

    #[test]
    fn test_no_tmp_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".store");
        let mut store = JsonStore::open(&dir).unwrap();
        store.put_note(&note("1", "x")).unwrap();
        store.put_folder(&Folder::new("Work".to_string())).unwrap();

        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_stable_file_bytes_regardless_of_insert_order() {
        let tmp = TempDir::new().unwrap();

        let dir_a = tmp.path().join("a");
        let mut a = JsonStore::open(&dir_a).unwrap();
        a.put_note(&note("1", "x")).unwrap();
        a.put_note(&note("2", "y")).unwrap();

        let dir_b = tmp.path().join("b");
        let mut b = JsonStore::open(&dir_b).unwrap();
        b.put_note(&note("2", "y")).unwrap();
        b.put_note(&note("1", "x")).unwrap();

        let bytes_a = fs::read(dir_a.join("notes.json")).unwrap();
        let bytes_b = fs::read(dir_b.join("notes.json")).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }
}
