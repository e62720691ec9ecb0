use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Identity conflict: {0}")]
    IdentityConflict(String),

    #[error("File system not available")]
    Unavailable,

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
