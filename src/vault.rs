//! # Vault
//!
//! The facade collaborators call: the editing surface, folder UI, and
//! anything else living outside the engine. A [`Vault`] owns one
//! [`FileSystem`] adapter, one [`RecordStore`], and the storage root, and
//! funnels every user action through the same discipline the scan
//! enforces:
//!
//! - **Filesystem effect first, store update second.** A move, rename,
//!   delete, or restore touches the tree before the record, so a failure
//!   leaves the store describing where things actually are rather than a
//!   phantom location.
//! - The directory tree stays the placement authority. Operations that
//!   can tolerate a missing directory (a note with no on-disk artifact)
//!   treat it as "storeless" and carry on; the next scan converges the
//!   rest.
//!
//! [`Vault::open`] runs the startup scan before returning, so every read
//! issued through an open vault sees post-reconciliation records.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::VaultConfig;
use crate::error::{Result, VaultError};
use crate::fs::FileSystem;
use crate::model::{now_millis, CategoryId, Folder, Note, TRASH_FOLDER_ID};
use crate::paths::{
    note_dir_name, sanitize_file_name, PathResolver, TRASH_DIR, UNCATEGORIZED_DIR,
};
use crate::store::RecordStore;
use crate::sync::{SyncEngine, SyncReport};
use crate::writer::write_note_files;

const DEFAULT_NOTE_TITLE: &str = "New Note";

pub struct Vault<F: FileSystem, S: RecordStore> {
    fs: F,
    store: S,
    root: PathBuf,
}

impl<F: FileSystem, S: RecordStore> Vault<F, S> {
    /// Assemble a vault without scanning. Useful when the caller wants to
    /// control exactly when the scan runs.
    pub fn new(fs: F, store: S, root: PathBuf) -> Self {
        Self { fs, store, root }
    }

    /// Ensure the storage root exists and run the startup scan. Nothing
    /// should read records before this returns.
    pub fn open(fs: F, store: S, config: &VaultConfig) -> Result<Self> {
        let root = config.resolve_root();
        if fs.is_available() {
            fs.create_dir_all(&root)?;
        }
        let mut vault = Self::new(fs, store, root);
        vault.sync()?;
        Ok(vault)
    }

    /// Run one reconciliation pass against the current root.
    pub fn sync(&mut self) -> Result<SyncReport> {
        SyncEngine::new(&self.fs, &mut self.store, &self.root).run()
    }

    /// Point the vault at a different storage root and rescan it.
    pub fn change_root(&mut self, root: PathBuf) -> Result<SyncReport> {
        if self.fs.is_available() {
            self.fs.create_dir_all(&root)?;
        }
        self.root = root;
        self.sync()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Direct record access, for collaborators that manage fields the
    /// vault has no operation for (tags, for one). Writes through this
    /// handle skip the filesystem side entirely.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn notes(&self) -> Result<Vec<Note>> {
        self.store.notes()
    }

    pub fn note(&self, id: &str) -> Result<Option<Note>> {
        self.store.note(id)
    }

    pub fn folders(&self) -> Result<Vec<Folder>> {
        self.store.folders()
    }

    pub fn folder(&self, id: &str) -> Result<Option<Folder>> {
        self.store.folder(id)
    }

    /// Where the note's directory currently sits, or `None` for a note
    /// with no on-disk artifact.
    pub fn note_path(&self, id: &str) -> Option<PathBuf> {
        PathResolver::new(&self.fs, &self.root).find_note_dir(id)
    }

    /// Create a blank note, carve its directory, and register the record.
    pub fn create_note(&mut self, folder_id: Option<&str>) -> Result<Note> {
        let mut note = Note::new(DEFAULT_NOTE_TITLE.to_string());
        note.folder_id = folder_id.map(str::to_string);
        note.order = Some(now_millis());

        let dir = self.create_note_dir(&note)?;
        write_note_files(&self.fs, &dir, &note, "");

        self.store.put_note(&note)?;
        Ok(note)
    }

    /// Persist edited content `(content, plainText, title)`. The directory
    /// is renamed when the title changed, and the companion files are
    /// refreshed when there is text to write.
    pub fn save_note(
        &mut self,
        id: &str,
        content: &str,
        plain_text: &str,
        title: &str,
    ) -> Result<Note> {
        let mut note = self.require_note(id)?;
        let old_title = note.title.clone();
        note.content = content.to_string();
        note.title = title.to_string();
        note.touch();

        if old_title != note.title {
            self.rename_note_dir(&note);
        }
        if !plain_text.is_empty() {
            match self.note_path(id) {
                Some(dir) => write_note_files(&self.fs, &dir, &note, plain_text),
                None => debug!("No directory for note {}; skipping file write", id),
            }
        }

        self.store.put_note(&note)?;
        Ok(note)
    }

    /// Soft-delete: the directory moves under `Trash` and the record is
    /// flagged. The record keeps its folder id so restore knows where
    /// home is.
    pub fn trash_note(&mut self, id: &str) -> Result<Note> {
        let mut note = self.require_note(id)?;
        self.move_note_dir(id, Some(TRASH_FOLDER_ID))?;
        note.is_deleted = true;
        self.store.put_note(&note)?;
        Ok(note)
    }

    /// Bring a note back out of `Trash`, to its folder or `Uncategorized`.
    pub fn restore_note(&mut self, id: &str) -> Result<Note> {
        let mut note = self.require_note(id)?;
        if note.in_trash() {
            // Trashed via move_note rather than trash_note; its old home
            // is gone, so it comes back uncategorized.
            note.folder_id = None;
        }
        self.move_note_dir(id, note.folder_id.as_deref())?;
        note.is_deleted = false;
        self.store.put_note(&note)?;
        Ok(note)
    }

    /// Hard-delete: remove the directory and the record.
    pub fn purge_note(&mut self, id: &str) -> Result<()> {
        self.require_note(id)?;
        if let Some(dir) = self.note_path(id) {
            self.fs.remove(&dir)?;
        }
        self.store.delete_note(id)
    }

    pub fn toggle_pin(&mut self, id: &str) -> Result<Note> {
        let mut note = self.require_note(id)?;
        note.is_pinned = !note.is_pinned;
        self.store.put_note(&note)?;
        Ok(note)
    }

    /// File a note under a different category, `Trash` included.
    pub fn move_note(&mut self, id: &str, target: &CategoryId) -> Result<Note> {
        let mut note = self.require_note(id)?;
        self.move_note_dir(id, target.folder_id().as_deref())?;

        note.folder_id = target.folder_id();
        if target.is_trash() {
            note.is_deleted = true;
        } else if note.is_deleted {
            note.is_deleted = false;
        }

        self.store.put_note(&note)?;
        Ok(note)
    }

    /// Persist a manual ordering: the first id gets the largest sort key.
    /// Unknown ids are skipped.
    pub fn reorder_notes<I: AsRef<str>>(&mut self, ids: &[I]) -> Result<()> {
        let base = now_millis();
        for (i, id) in ids.iter().enumerate() {
            let id = id.as_ref();
            match self.store.note(id)? {
                Some(mut note) => {
                    note.order = Some(base - (i as i64) * 1000);
                    self.store.put_note(&note)?;
                }
                None => debug!("Skipping reorder of unknown note {}", id),
            }
        }
        Ok(())
    }

    /// Save an attachment into the note's directory and return its path.
    /// This is an explicit user action, so failures surface instead of
    /// degrading.
    pub fn attach_file(&self, id: &str, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        if !self.fs.is_available() {
            return Err(VaultError::Unavailable);
        }
        let note = self.require_note(id)?;

        let dir = match self.note_path(id) {
            Some(dir) => dir,
            // A storeless note gets its directory carved on demand.
            None => self.create_note_dir(&note)?,
        };

        let stamped = format!("{}_{}", now_millis(), sanitize_file_name(file_name));
        let path = dir.join(stamped);
        self.fs.write_binary(&path, contents)?;
        Ok(path)
    }

    /// Create a folder record and carve its category directory.
    pub fn create_folder(&mut self, name: &str) -> Result<Folder> {
        let folder = Folder::new(name.to_string());
        let path = self.root.join(sanitize_file_name(name));
        if let Err(e) = self.fs.create_dir_all(&path) {
            warn!("Failed to create category directory {}: {}", path.display(), e);
        }
        self.store.put_folder(&folder)?;
        Ok(folder)
    }

    /// Rename a folder and its category directory. Renaming onto a name
    /// whose directory already exists is refused.
    pub fn rename_folder(&mut self, id: &str, new_name: &str) -> Result<Folder> {
        let mut folder = self.require_folder(id)?;
        let old_safe = sanitize_file_name(&folder.name);
        let new_safe = sanitize_file_name(new_name);

        if old_safe != new_safe {
            let old_path = self.root.join(&old_safe);
            if self.fs.exists(&old_path) {
                let new_path = self.root.join(&new_safe);
                if self.fs.exists(&new_path) {
                    return Err(VaultError::IdentityConflict(format!(
                        "category directory already exists: {new_safe}"
                    )));
                }
                self.fs.rename(&old_path, &new_path)?;
            }
        }

        folder.name = new_name.to_string();
        self.store.put_folder(&folder)?;
        Ok(folder)
    }

    /// Soft-delete a folder: its directory moves under `Trash` and the
    /// record is flagged. Contained note records converge at the next
    /// scan.
    pub fn trash_folder(&mut self, id: &str) -> Result<Folder> {
        let mut folder = self.require_folder(id)?;
        let safe = sanitize_file_name(&folder.name);
        let src = self.root.join(&safe);
        if self.fs.exists(&src) {
            let trash = self.root.join(TRASH_DIR);
            self.fs.create_dir_all(&trash)?;
            self.fs.rename(&src, &trash.join(&safe))?;
        }

        folder.is_deleted = true;
        self.store.put_folder(&folder)?;
        Ok(folder)
    }

    /// Bring a folder back from `Trash`.
    pub fn restore_folder(&mut self, id: &str) -> Result<Folder> {
        let mut folder = self.require_folder(id)?;
        let safe = sanitize_file_name(&folder.name);
        let src = self.root.join(TRASH_DIR).join(&safe);
        if self.fs.exists(&src) {
            self.fs.rename(&src, &self.root.join(&safe))?;
        }

        folder.is_deleted = false;
        self.store.put_folder(&folder)?;
        Ok(folder)
    }

    /// Hard-delete a folder: remove its directory (at the root or in
    /// `Trash`), its record, and the records of the notes filed under it.
    pub fn purge_folder(&mut self, id: &str) -> Result<()> {
        let folder = self.require_folder(id)?;
        let safe = sanitize_file_name(&folder.name);
        let mut path = self.root.join(&safe);
        if !self.fs.exists(&path) {
            path = self.root.join(TRASH_DIR).join(&safe);
        }
        if self.fs.exists(&path) {
            self.fs.remove(&path)?;
        }

        self.store.delete_folder(id)?;
        let contained: Vec<String> = self
            .store
            .notes()?
            .into_iter()
            .filter(|n| n.folder_id.as_deref() == Some(id))
            .map(|n| n.id)
            .collect();
        for note_id in &contained {
            self.store.delete_note(note_id)?;
        }
        Ok(())
    }

    fn require_note(&self, id: &str) -> Result<Note> {
        self.store
            .note(id)?
            .ok_or_else(|| VaultError::NoteNotFound(id.to_string()))
    }

    fn require_folder(&self, id: &str) -> Result<Folder> {
        self.store
            .folder(id)?
            .ok_or_else(|| VaultError::FolderNotFound(id.to_string()))
    }

    /// The category directory name a note with this folder id lives under.
    /// Unknown folder ids fall back to `Uncategorized`.
    fn category_dir_name(&self, folder_id: Option<&str>) -> Result<String> {
        match folder_id {
            None => Ok(UNCATEGORIZED_DIR.to_string()),
            Some(TRASH_FOLDER_ID) => Ok(TRASH_DIR.to_string()),
            Some(id) => Ok(self
                .store
                .folder(id)?
                .map(|f| f.name)
                .unwrap_or_else(|| UNCATEGORIZED_DIR.to_string())),
        }
    }

    fn category_path(&self, folder_id: Option<&str>) -> Result<PathBuf> {
        let name = self.category_dir_name(folder_id)?;
        Ok(self.root.join(sanitize_file_name(&name)))
    }

    /// Carve `<root>/<Category>/<Title>_<id>/`, parents included.
    fn create_note_dir(&self, note: &Note) -> Result<PathBuf> {
        let dir = self
            .category_path(note.folder_id.as_deref())?
            .join(note_dir_name(&note.title, &note.id));
        self.fs.create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Move the note directory to match a retitled note. Best-effort: on
    /// failure the old directory name stays, while the snapshot inside it
    /// carries the new title.
    fn rename_note_dir(&self, note: &Note) {
        let Some(current) = self.note_path(&note.id) else {
            return;
        };
        let target = current.with_file_name(note_dir_name(&note.title, &note.id));
        if target == current {
            return;
        }
        if let Err(e) = self.fs.rename(&current, &target) {
            warn!(
                "Failed to rename note directory {}: {}",
                current.display(),
                e
            );
        }
    }

    /// Physically move a note directory into the category for `folder_id`,
    /// keeping its directory name. A note with no on-disk artifact is left
    /// alone.
    fn move_note_dir(&self, id: &str, folder_id: Option<&str>) -> Result<()> {
        let Some(current) = self.note_path(id) else {
            return Ok(());
        };
        let cat_path = self.category_path(folder_id)?;
        self.fs.create_dir_all(&cat_path)?;

        let Some(base) = current.file_name() else {
            return Ok(());
        };
        let target = cat_path.join(base);
        if target != current {
            self.fs.rename(&current, &target)?;
        }
        Ok(())
    }
}
