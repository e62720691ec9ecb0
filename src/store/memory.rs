use std::collections::BTreeMap;

use super::RecordStore;
use crate::error::Result;
use crate::model::{Folder, Note};

/// In-memory record store.
///
/// Backs tests, and pairs with [`crate::fs::NullFileSystem`] to run the
/// vault without any persistence at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: BTreeMap<String, Note>,
    folders: BTreeMap<String, Folder>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn notes(&self) -> Result<Vec<Note>> {
        Ok(self.notes.values().cloned().collect())
    }

    fn note(&self, id: &str) -> Result<Option<Note>> {
        Ok(self.notes.get(id).cloned())
    }

    fn put_note(&mut self, note: &Note) -> Result<()> {
        self.notes.insert(note.id.clone(), note.clone());
        Ok(())
    }

    fn delete_note(&mut self, id: &str) -> Result<()> {
        self.notes.remove(id);
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
        Ok(())
    }

    fn delete_folder(&mut self, id: &str) -> Result<()> {
        self.folders.remove(id);
        Ok(())
    }
}
