//! # Domain Model: Notes, Folders, and Identity
//!
//! The two record types mirror what the host application persists: [`Note`]
//! and [`Folder`]. Both serialize with camelCase field names because the
//! same shape is written verbatim into each note directory as its
//! `data.json` snapshot, and snapshots written by older builds must keep
//! parsing.
//!
//! ## Identity
//!
//! Ids are opaque decimal-digit strings minted from the epoch-millisecond
//! clock. The digits matter: a note's id is embedded in its directory name
//! as a `_<digits>` suffix, so anything non-decimal would break directory
//! name parsing. [`mint_note_id`] guarantees process-wide uniqueness with a
//! monotonic high-water mark — two imports in the same millisecond must not
//! collide. Folder ids carry three extra digits of sub-millisecond entropy
//! so a folder and a note minted together stay distinct.
//!
//! ## Content
//!
//! `Note.content` is an opaque serialized rich-text document (a Quill
//! Delta). The engine never inspects it beyond two fixed points:
//! [`DEFAULT_CONTENT`] for brand-new or synthesized notes, and
//! [`delta_from_plain_text`] to seed an imported note from a plain-text
//! companion file.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Sentinel folder id marking a note as trashed.
pub const TRASH_FOLDER_ID: &str = "trash";

/// Serialized empty document: a single newline insert.
pub const DEFAULT_CONTENT: &str = r#"{"ops":[{"insert":"\n"}]}"#;

/// A note record, whole-value. The same shape is persisted to the store
/// and, pretty-printed, as the `data.json` snapshot in the note directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_content")]
    pub content: String,
    #[serde(default)]
    pub updated_at: i64,
    /// Manual sort key. Absent until the user reorders, and omitted from
    /// snapshots when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// `None` means uncategorized; [`TRASH_FOLDER_ID`] means trashed.
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_pinned: bool,
}

fn default_content() -> String {
    DEFAULT_CONTENT.to_string()
}

impl Note {
    /// A minimal record: freshly minted id, default content, current
    /// timestamp, uncategorized. Both `Vault::create_note` and scan
    /// synthesis start from this.
    pub fn new(title: String) -> Self {
        Self {
            id: mint_note_id(),
            title,
            content: DEFAULT_CONTENT.to_string(),
            updated_at: now_millis(),
            order: None,
            folder_id: None,
            tags: Vec::new(),
            is_deleted: false,
            is_pinned: false,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    pub fn in_trash(&self) -> bool {
        self.folder_id.as_deref() == Some(TRASH_FOLDER_ID)
    }
}

/// A folder record. Its physical counterpart is a top-level category
/// directory named after it (sanitized), or a subdirectory of `Trash`
/// while deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Folder {
    pub fn new(name: String) -> Self {
        Self {
            id: mint_folder_id(),
            name,
            is_deleted: false,
        }
    }
}

/// Resolved identity of a category directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryId {
    /// The `Uncategorized` directory: notes with no folder.
    Uncategorized,
    /// The `Trash` directory.
    Trash,
    /// A user folder, by record id.
    Folder(String),
}

impl CategoryId {
    /// The `folder_id` a note filed under this category carries.
    pub fn folder_id(&self) -> Option<String> {
        match self {
            CategoryId::Uncategorized => None,
            CategoryId::Trash => Some(TRASH_FOLDER_ID.to_string()),
            CategoryId::Folder(id) => Some(id.clone()),
        }
    }

    pub fn is_trash(&self) -> bool {
        matches!(self, CategoryId::Trash)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

static LAST_MINTED: AtomicI64 = AtomicI64::new(0);

/// A millisecond value unique within this process. Wall-clock milliseconds
/// collide when two ids are minted in the same millisecond; the high-water
/// mark bumps the later one forward.
pub(crate) fn next_unique_millis() -> i64 {
    let now = now_millis();
    let mut last = LAST_MINTED.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_MINTED.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// Mint a fresh note id: unique epoch milliseconds, decimal.
pub fn mint_note_id() -> String {
    next_unique_millis().to_string()
}

/// Mint a fresh folder id: unique epoch milliseconds plus three digits of
/// sub-millisecond entropy.
pub fn mint_folder_id() -> String {
    format!("{}{:03}", next_unique_millis(), entropy_digits())
}

fn entropy_digits() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0)
        % 1000
}

/// Wrap plain text in a single-insert document, newline-terminated.
pub fn delta_from_plain_text(text: &str) -> String {
    serde_json::json!({ "ops": [{ "insert": format!("{text}\n") }] }).to_string()
}
