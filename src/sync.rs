//! # Sync Engine
//!
//! The reconciliation scan that converges the record store with the
//! directory tree. The tree is the enumeration authority — what exists and
//! where it lives — while record content is resolved freshest-first.
//!
//! ## The pass
//!
//! One scan is a single non-re-entrant pass:
//!
//! 1. **Load** both record collections from the store.
//! 2. **List the root.** Each non-hidden child directory is a category.
//!    A failure here aborts the scan with the store untouched.
//! 3. **Resolve category identity**: `Uncategorized` and `Trash` map to
//!    sentinels; any other name reuses the id of a folder record with the
//!    same name, or mints one. The deleted flag carries over from a
//!    matched record.
//! 4. **List each category.** Child directories are note-directory
//!    candidates. Inside `Trash`, a child that doesn't parse as a note
//!    directory is a *deleted category*: it resolves like step 3 with the
//!    deleted flag forced on, and its own children scan as trashed notes.
//! 5. **Identify or import** each note directory by its `<title>_<id>`
//!    name. Foreign names get a freshly minted id and are renamed in
//!    place to stamp the convention; a rename failure skips just that
//!    directory.
//! 6. **Load or synthesize** the record: parse `data.json`, or build a
//!    minimal record from the directory name (seeding content from
//!    `content.txt` when present) and stamp the snapshot back to disk so
//!    the next scan parses instead of re-synthesizing.
//! 7. **Reconcile** against the stored record of the same id: the side
//!    with the strictly greater `updatedAt` wins, and when that is the
//!    store, the on-disk snapshot is rewritten from it. Either way the
//!    resolved record's `folderId`/`isDeleted` are forced from the
//!    directory's physical category.
//! 8. **Commit**: folder records never resolved are pruned, then resolved
//!    folders upserted; same for notes; deletes before upserts, folders
//!    before notes, id order throughout.
//!
//! ## Failure semantics
//!
//! Failures inside one note directory (steps 5–7) are logged and isolated
//! to that directory. A directory skipped after its id was learned still
//! protects the existing record from the prune — a skip must not read as
//! a deletion. Listing failures (root, category) abort the whole pass
//! before anything is committed.
//!
//! Running against an unavailable adapter is a no-op: an empty listing
//! from a missing filesystem must not prune a populated store.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::fs::{DirEntry, FileSystem};
use crate::model::{delta_from_plain_text, mint_note_id, CategoryId, Folder, Note};
use crate::paths::{note_dir_name, split_note_dir_name, TRASH_DIR, UNCATEGORIZED_DIR};
use crate::store::RecordStore;
use crate::writer::{read_snapshot, write_snapshot, PLAIN_TEXT_FILE};

/// Counters from one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Note records resolved from the tree.
    pub notes: usize,
    /// Folder records resolved from the tree.
    pub folders: usize,
    /// Foreign directories imported and stamped.
    pub imported: usize,
    /// Records synthesized because the snapshot was absent or malformed.
    pub synthesized: usize,
    /// Snapshots rewritten to disk because the stored record was newer.
    pub restored: usize,
    /// Note records pruned for lacking a directory.
    pub pruned_notes: usize,
    /// Folder records pruned for lacking a directory.
    pub pruned_folders: usize,
    /// Directories skipped after a failure.
    pub skipped: usize,
}

/// Scratch state for one pass.
#[derive(Default)]
struct ScanPass {
    stored_notes: BTreeMap<String, Note>,
    stored_folders: Vec<Folder>,
    resolved_folders: BTreeMap<String, Folder>,
    resolved_notes: BTreeMap<String, Note>,
    /// Ids with a directory on disk, including ones whose processing
    /// failed; these survive the prune.
    seen_notes: BTreeSet<String>,
    report: SyncReport,
}

/// One reconciliation scan over a storage root.
pub struct SyncEngine<'a, F: FileSystem, S: RecordStore> {
    fs: &'a F,
    store: &'a mut S,
    root: &'a Path,
}

impl<'a, F: FileSystem, S: RecordStore> SyncEngine<'a, F, S> {
    pub fn new(fs: &'a F, store: &'a mut S, root: &'a Path) -> Self {
        Self { fs, store, root }
    }

    /// Run the pass. See the module doc for the step-by-step contract.
    pub fn run(mut self) -> Result<SyncReport> {
        if !self.fs.is_available() {
            debug!("File system unavailable; skipping sync");
            return Ok(SyncReport::default());
        }

        let mut pass = ScanPass::default();
        pass.stored_notes = self
            .store
            .notes()?
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        pass.stored_folders = self.store.folders()?;

        let categories = self.fs.read_dir(self.root)?;

        for cat in &categories {
            if !cat.is_dir || cat.name.starts_with('.') {
                continue;
            }
            let identity = self.resolve_category(&mut pass, &cat.name);
            self.scan_category(&mut pass, cat, &identity)?;
        }

        pass.report.notes = pass.resolved_notes.len();
        pass.report.folders = pass.resolved_folders.len();
        self.commit(&mut pass)?;

        debug!(
            "Sync complete: {} notes, {} folders ({} imported, {} synthesized, {} restored, {} + {} pruned, {} skipped)",
            pass.report.notes,
            pass.report.folders,
            pass.report.imported,
            pass.report.synthesized,
            pass.report.restored,
            pass.report.pruned_notes,
            pass.report.pruned_folders,
            pass.report.skipped,
        );
        Ok(pass.report)
    }

    fn resolve_category(&self, pass: &mut ScanPass, name: &str) -> CategoryId {
        if name == UNCATEGORIZED_DIR {
            return CategoryId::Uncategorized;
        }
        if name == TRASH_DIR {
            return CategoryId::Trash;
        }
        CategoryId::Folder(self.resolve_folder(pass, name, false))
    }

    /// Reuse a folder id by exact name, or mint one, and register the
    /// resolved record. `in_trash` is for categories found under `Trash`,
    /// whose deleted flag is forced by location.
    fn resolve_folder(&self, pass: &mut ScanPass, name: &str, in_trash: bool) -> String {
        // Earlier in this pass first, so two same-named directories share
        // one identity instead of minting twice.
        if let Some(resolved) = pass.resolved_folders.values().find(|f| f.name == name) {
            return resolved.id.clone();
        }

        let folder = match pass.stored_folders.iter().find(|f| f.name == name) {
            Some(stored) => Folder {
                id: stored.id.clone(),
                name: name.to_string(),
                is_deleted: in_trash || stored.is_deleted,
            },
            None => {
                let mut folder = Folder::new(name.to_string());
                folder.is_deleted = in_trash;
                debug!("New folder record {} for directory {}", folder.id, name);
                folder
            }
        };

        let id = folder.id.clone();
        pass.resolved_folders.insert(id.clone(), folder);
        id
    }

    fn scan_category(
        &self,
        pass: &mut ScanPass,
        cat: &DirEntry,
        identity: &CategoryId,
    ) -> Result<()> {
        let entries = self.fs.read_dir(&cat.path)?;

        for entry in entries.iter().filter(|e| e.is_dir) {
            if entry.name.starts_with('.') {
                continue;
            }
            if identity.is_trash() && split_note_dir_name(&entry.name).is_none() {
                // A category moved into Trash keeps its own note
                // directories one level deeper.
                let folder_id = self.resolve_folder(pass, &entry.name, true);
                self.scan_trashed_category(pass, entry, &folder_id)?;
                continue;
            }

            self.process_note_dir(pass, entry, identity.folder_id(), identity.is_trash());
        }
        Ok(())
    }

    fn scan_trashed_category(
        &self,
        pass: &mut ScanPass,
        dir: &DirEntry,
        folder_id: &str,
    ) -> Result<()> {
        let entries = self.fs.read_dir(&dir.path)?;
        for entry in entries.iter().filter(|e| e.is_dir) {
            if entry.name.starts_with('.') {
                continue;
            }
            self.process_note_dir(pass, entry, Some(folder_id.to_string()), true);
        }
        Ok(())
    }

    /// Steps 5–7 for one note directory. Failures in here never escape:
    /// they degrade (synthesis, skipped write-back) or skip the directory.
    fn process_note_dir(
        &self,
        pass: &mut ScanPass,
        entry: &DirEntry,
        folder_id: Option<String>,
        in_trash: bool,
    ) {
        let (dir_path, note_id, dir_title) = match split_note_dir_name(&entry.name) {
            Some((title, id)) => (entry.path.clone(), id.to_string(), title.to_string()),
            None => {
                // Foreign directory: mint an id and stamp the convention.
                let id = mint_note_id();
                let stamped = note_dir_name(&entry.name, &id);
                let target = entry.path.with_file_name(&stamped);
                if let Err(e) = self.fs.rename(&entry.path, &target) {
                    warn!(
                        "Failed to stamp imported directory {}: {}",
                        entry.path.display(),
                        e
                    );
                    pass.report.skipped += 1;
                    return;
                }
                debug!("Imported foreign directory {} as {}", entry.name, stamped);
                pass.report.imported += 1;
                (target, id, entry.name.clone())
            }
        };

        pass.seen_notes.insert(note_id.clone());

        let mut candidate = match read_snapshot(self.fs, &dir_path) {
            Some(mut snapshot) => {
                if snapshot.id != note_id {
                    warn!(
                        "Snapshot in {} carries id {:?}; the directory name wins",
                        dir_path.display(),
                        snapshot.id
                    );
                    snapshot.id = note_id.clone();
                }
                snapshot
            }
            None => {
                let synthesized = self.synthesize(&dir_path, &note_id, &dir_title);
                // Stamp the snapshot so the next scan parses instead of
                // re-synthesizing a fresh timestamp.
                if let Err(e) = write_snapshot(self.fs, &dir_path, &synthesized) {
                    warn!(
                        "Failed to write synthesized snapshot in {}: {}",
                        dir_path.display(),
                        e
                    );
                }
                pass.report.synthesized += 1;
                synthesized
            }
        };

        if let Some(stored) = pass.stored_notes.get(&note_id) {
            if stored.updated_at > candidate.updated_at {
                debug!("Store is newer for {}; restoring snapshot to disk", note_id);
                candidate = stored.clone();
                match write_snapshot(self.fs, &dir_path, &candidate) {
                    Ok(()) => pass.report.restored += 1,
                    Err(e) => warn!(
                        "Failed to restore snapshot in {}: {}",
                        dir_path.display(),
                        e
                    ),
                }
            }
        }

        // Physical location always wins for placement, in both directions.
        candidate.folder_id = folder_id;
        candidate.is_deleted = in_trash;

        pass.resolved_notes.insert(note_id, candidate);
    }

    /// A record built from directory evidence alone: id and title from the
    /// name, content seeded from the plain-text companion when readable.
    fn synthesize(&self, dir_path: &Path, id: &str, title: &str) -> Note {
        let mut note = Note::new(title.to_string());
        note.id = id.to_string();

        let txt_path = dir_path.join(PLAIN_TEXT_FILE);
        if self.fs.exists(&txt_path) {
            match self.fs.read_to_string(&txt_path) {
                Ok(text) => note.content = delta_from_plain_text(&text),
                Err(e) => warn!("Failed to read {}: {}", txt_path.display(), e),
            }
        }
        note
    }

    fn commit(&mut self, pass: &mut ScanPass) -> Result<()> {
        for folder in &pass.stored_folders {
            if !pass.resolved_folders.contains_key(&folder.id) {
                self.store.delete_folder(&folder.id)?;
                pass.report.pruned_folders += 1;
            }
        }
        for folder in pass.resolved_folders.values() {
            self.store.put_folder(folder)?;
        }

        for id in pass.stored_notes.keys() {
            if !pass.seen_notes.contains(id) {
                self.store.delete_note(id)?;
                pass.report.pruned_notes += 1;
            }
        }
        for note in pass.resolved_notes.values() {
            self.store.put_note(note)?;
        }
        Ok(())
    }
}
