//! # Record Store
//!
//! The store side of the vault's split-brain model:
//!
//! 1. **Enumeration authority**: the directory tree. What exists and where
//!    it lives is decided by directories on disk.
//! 2. **Record database**: two collections, `notes` and `folders`, holding
//!    the full structured records the application reads.
//!
//! The store is assumed *always potentially stale* — the user may have
//! renamed, moved, or deleted directories since the last run — and the
//! sync engine reconverges it at startup. Between scans, user actions keep
//! both sides updated directly.
//!
//! ## Semantics
//!
//! - Records are whole-value: a put replaces the full record, there are no
//!   partial updates.
//! - Deletes are idempotent: removing an absent id succeeds. The sync
//!   engine's prune step leans on this.
//! - `notes()`/`folders()` return records in id order, so scans and
//!   commits are deterministic.
//! - The two collections are independent. A note referencing a missing
//!   folder id is not rejected; callers must not assume cross-collection
//!   consistency.
//!
//! ## Implementations
//!
//! - [`json::JsonStore`]: collections materialized in memory, persisted as
//!   two pretty-printed JSON files with atomic rewrites.
//! - [`memory::MemoryStore`]: maps only, for tests and for running behind
//!   the no-op filesystem.
//!
//! ## Storage Layout
//!
//! ```text
//! <records dir>/              # dot-named under the root by default,
//! ├── notes.json              # so the scan never sees it
//! └── folders.json
//! ```

use crate::error::Result;
use crate::model::{Folder, Note};

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Abstract interface for record persistence.
pub trait RecordStore {
    /// All note records, in id order.
    fn notes(&self) -> Result<Vec<Note>>;

    /// A note by id, `None` when absent.
    fn note(&self, id: &str) -> Result<Option<Note>>;

    /// Upsert a whole note record.
    fn put_note(&mut self, note: &Note) -> Result<()>;

    /// Remove a note record. Removing an absent id succeeds.
    fn delete_note(&mut self, id: &str) -> Result<()>;

    /// All folder records, in id order.
    fn folders(&self) -> Result<Vec<Folder>>;

    /// A folder by id, `None` when absent.
    fn folder(&self, id: &str) -> Result<Option<Folder>>;

    /// Upsert a whole folder record.
    fn put_folder(&mut self, folder: &Folder) -> Result<()>;

    /// Remove a folder record. Removing an absent id succeeds.
    fn delete_folder(&mut self, id: &str) -> Result<()>;
}
