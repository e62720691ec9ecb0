//! # MemoVault Architecture
//!
//! MemoVault is the storage engine for a note-taking application whose
//! notes live **twice**: as records in a fast local store the UI reads,
//! and as plain directories and files the user can browse, back up, and
//! edit with ordinary tools. The engine's whole job is keeping those two
//! worlds convergent, with the directory tree as the authority for what
//! exists and where it lives.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Vault (vault.rs)                                           │
//! │  - The facade collaborators call (editor, folder UI)        │
//! │  - Every user action: filesystem effect first, then store   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Sync Engine (sync.rs)                                      │
//! │  - The startup scan: enumerate, identify, import,           │
//! │    synthesize, reconcile, prune                             │
//! │  - The only code allowed to delete records wholesale        │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                       │
//!                    ▼                       ▼
//! ┌───────────────────────────┐ ┌───────────────────────────────┐
//! │  FileSystem (fs/)         │ │  RecordStore (store/)         │
//! │  - Abstract adapter trait │ │  - Whole-record collections   │
//! │  - OsFileSystem (real)    │ │  - JsonStore (persistent)     │
//! │  - NullFileSystem (none)  │ │  - MemoryStore (testing)      │
//! └───────────────────────────┘ └───────────────────────────────┘
//! ```
//!
//! Supporting casts: [`paths`] owns the `<Title>_<id>` directory naming
//! convention and finds note directories, [`writer`] owns the two files
//! inside each note directory, [`model`] owns the record types and id
//! minting, [`config`] resolves where the storage root lives.
//!
//! ## Key Principle: The Tree Is the Enumeration Authority
//!
//! After a scan commits, every record in the store has a directory on
//! disk and every note directory has a record. Records the tree no longer
//! backs are pruned; directories the store never heard of are imported.
//! Record *content* is merged freshest-first, but *placement* (folder,
//! trashed state) always comes from where the directory physically sits.
//! Users are allowed to move directories around behind the engine's back;
//! the next scan believes them.
//!
//! ## No Hidden Globals
//!
//! Nothing in this crate reaches for ambient state. The storage root
//! comes in through [`config::VaultConfig`], the filesystem through a
//! [`fs::FileSystem`] value, the record store through a
//! [`store::RecordStore`] value. Swapping any of them is a constructor
//! argument, which is also exactly how the tests work.
//!
//! ## Module Overview
//!
//! - [`vault`]: The facade — entry point for all operations
//! - [`sync`]: The reconciliation scan
//! - [`fs`]: Filesystem adapter trait and backends
//! - [`store`]: Record persistence trait and backends
//! - [`paths`]: Directory naming and note-directory lookup
//! - [`writer`]: The per-note companion files
//! - [`model`]: Record types, ids, timestamps
//! - [`config`]: Storage root configuration
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod fs;
pub mod model;
pub mod paths;
pub mod store;
pub mod sync;
pub mod vault;
pub mod writer;
