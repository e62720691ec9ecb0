use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use memovault::config::VaultConfig;
use memovault::error::VaultError;
use memovault::fs::{NullFileSystem, OsFileSystem};
use memovault::model::{CategoryId, Note, TRASH_FOLDER_ID};
use memovault::store::MemoryStore;
use memovault::vault::Vault;

fn setup() -> (TempDir, PathBuf, Vault<OsFileSystem, MemoryStore>) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("MemoVault");
    let config = VaultConfig {
        storage_root: Some(root.clone()),
        ..Default::default()
    };
    let vault = Vault::open(OsFileSystem::new(), MemoryStore::new(), &config).unwrap();
    (tmp, root, vault)
}

fn read_disk_snapshot(dir: &std::path::Path) -> Note {
    serde_json::from_str(&fs::read_to_string(dir.join("data.json")).unwrap()).unwrap()
}

#[test]
fn test_open_runs_startup_scan() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("MemoVault");
    fs::create_dir_all(root.join("Work").join("Report_7")).unwrap();

    let config = VaultConfig {
        storage_root: Some(root),
        ..Default::default()
    };
    let vault = Vault::open(OsFileSystem::new(), MemoryStore::new(), &config).unwrap();

    // Reads issued right after open already see reconciled records.
    assert_eq!(vault.notes().unwrap().len(), 1);
    assert_eq!(vault.folders().unwrap().len(), 1);
}

#[test]
fn test_create_note_carves_directory_and_files() {
    let (_tmp, root, mut vault) = setup();
    let note = vault.create_note(None).unwrap();

    assert_eq!(note.title, "New Note");
    assert!(note.order.is_some());
    assert!(vault.note(&note.id).unwrap().is_some());

    let dir = root
        .join("Uncategorized")
        .join(format!("New Note_{}", note.id));
    assert!(dir.is_dir());
    assert!(dir.join("data.json").is_file());
    assert_eq!(fs::read_to_string(dir.join("content.txt")).unwrap(), "");
    assert_eq!(read_disk_snapshot(&dir).id, note.id);
}

#[test]
fn test_create_note_in_folder() {
    let (_tmp, root, mut vault) = setup();
    let folder = vault.create_folder("Work").unwrap();
    let note = vault.create_note(Some(&folder.id)).unwrap();

    assert_eq!(note.folder_id, Some(folder.id));
    assert!(root
        .join("Work")
        .join(format!("New Note_{}", note.id))
        .is_dir());
}

#[test]
fn test_save_note_renames_directory_and_writes_files() {
    let (_tmp, root, mut vault) = setup();
    let note = vault.create_note(None).unwrap();

    let content = r#"{"ops":[{"insert":"Buy milk\n"}]}"#;
    let saved = vault
        .save_note(&note.id, content, "Buy milk\n", "Groceries")
        .unwrap();

    assert_eq!(saved.title, "Groceries");
    assert_eq!(saved.content, content);
    assert!(saved.updated_at >= note.updated_at);

    let old_dir = root
        .join("Uncategorized")
        .join(format!("New Note_{}", note.id));
    let new_dir = root
        .join("Uncategorized")
        .join(format!("Groceries_{}", note.id));
    assert!(!old_dir.exists());
    assert!(new_dir.is_dir());
    assert_eq!(
        fs::read_to_string(new_dir.join("content.txt")).unwrap(),
        "Buy milk\n"
    );
    assert_eq!(read_disk_snapshot(&new_dir).title, "Groceries");
}

#[test]
fn test_save_with_empty_text_leaves_files_for_next_scan() {
    let (_tmp, root, mut vault) = setup();
    let note = vault.create_note(None).unwrap();

    vault
        .save_note(&note.id, r#"{"ops":[{"insert":"\n"}]}"#, "", "New Note")
        .unwrap();

    // No text to write: the snapshot on disk still carries the old save.
    let dir = root
        .join("Uncategorized")
        .join(format!("New Note_{}", note.id));
    let stale = read_disk_snapshot(&dir);
    assert_eq!(stale.updated_at, note.updated_at);

    // Age the disk copy, then let the scan restore it from the newer
    // store record.
    let mut backdated = stale;
    backdated.updated_at = 1;
    fs::write(
        dir.join("data.json"),
        serde_json::to_string_pretty(&backdated).unwrap(),
    )
    .unwrap();

    let report = vault.sync().unwrap();
    assert_eq!(report.restored, 1);
    let fresh = read_disk_snapshot(&dir);
    assert_eq!(
        fresh.updated_at,
        vault.note(&note.id).unwrap().unwrap().updated_at
    );
}

#[test]
fn test_trash_and_restore_note_keeps_folder() {
    let (_tmp, root, mut vault) = setup();
    let folder = vault.create_folder("Work").unwrap();
    let note = vault.create_note(Some(&folder.id)).unwrap();
    let dir_name = format!("New Note_{}", note.id);

    let trashed = vault.trash_note(&note.id).unwrap();
    assert!(trashed.is_deleted);
    // The record remembers its folder so restore knows where home is.
    assert_eq!(trashed.folder_id, Some(folder.id.clone()));
    assert!(root.join("Trash").join(&dir_name).is_dir());
    assert!(!root.join("Work").join(&dir_name).exists());

    let restored = vault.restore_note(&note.id).unwrap();
    assert!(!restored.is_deleted);
    assert_eq!(restored.folder_id, Some(folder.id));
    assert!(root.join("Work").join(&dir_name).is_dir());
    assert!(!root.join("Trash").join(&dir_name).exists());
}

#[test]
fn test_restore_after_move_to_trash_goes_uncategorized() {
    let (_tmp, root, mut vault) = setup();
    let note = vault.create_note(None).unwrap();
    let dir_name = format!("New Note_{}", note.id);

    let moved = vault.move_note(&note.id, &CategoryId::Trash).unwrap();
    assert!(moved.is_deleted);
    assert_eq!(moved.folder_id.as_deref(), Some(TRASH_FOLDER_ID));

    let restored = vault.restore_note(&note.id).unwrap();
    assert!(!restored.is_deleted);
    assert_eq!(restored.folder_id, None);
    assert!(root.join("Uncategorized").join(&dir_name).is_dir());
}

#[test]
fn test_move_note_between_categories() {
    let (_tmp, root, mut vault) = setup();
    let folder = vault.create_folder("Work").unwrap();
    let note = vault.create_note(None).unwrap();
    let dir_name = format!("New Note_{}", note.id);

    let moved = vault
        .move_note(&note.id, &CategoryId::Folder(folder.id.clone()))
        .unwrap();
    assert_eq!(moved.folder_id, Some(folder.id));
    assert!(!moved.is_deleted);
    assert!(root.join("Work").join(&dir_name).is_dir());
    assert!(!root.join("Uncategorized").join(&dir_name).exists());
}

#[test]
fn test_purge_note_removes_directory_and_record() {
    let (_tmp, root, mut vault) = setup();
    let note = vault.create_note(None).unwrap();
    let dir = root
        .join("Uncategorized")
        .join(format!("New Note_{}", note.id));
    assert!(dir.is_dir());

    vault.purge_note(&note.id).unwrap();

    assert!(!dir.exists());
    assert!(vault.note(&note.id).unwrap().is_none());
}

#[test]
fn test_toggle_pin_leaves_timestamp() {
    let (_tmp, _root, mut vault) = setup();
    let note = vault.create_note(None).unwrap();

    let pinned = vault.toggle_pin(&note.id).unwrap();
    assert!(pinned.is_pinned);
    // Pinning is not an edit.
    assert_eq!(pinned.updated_at, note.updated_at);

    let unpinned = vault.toggle_pin(&note.id).unwrap();
    assert!(!unpinned.is_pinned);
}

#[test]
fn test_reorder_notes() {
    let (_tmp, _root, mut vault) = setup();
    let a = vault.create_note(None).unwrap();
    let b = vault.create_note(None).unwrap();
    let c = vault.create_note(None).unwrap();

    vault
        .reorder_notes(&[c.id.as_str(), a.id.as_str(), "no-such-id"])
        .unwrap();

    let a_order = vault.note(&a.id).unwrap().unwrap().order.unwrap();
    let c_order = vault.note(&c.id).unwrap().unwrap().order.unwrap();
    assert!(c_order > a_order, "first listed id sorts highest");
    // Notes outside the reorder keep their old key.
    assert_eq!(vault.note(&b.id).unwrap().unwrap().order, b.order);
}

#[test]
fn test_attach_file() {
    let (_tmp, root, mut vault) = setup();
    let note = vault.create_note(None).unwrap();

    let path = vault
        .attach_file(&note.id, "my:photo.png", b"\x89PNG1234")
        .unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.ends_with("_my_photo.png"), "got {name}");
    assert!(path.starts_with(
        root.join("Uncategorized")
            .join(format!("New Note_{}", note.id))
    ));
    assert_eq!(fs::read(&path).unwrap(), b"\x89PNG1234");
}

#[test]
fn test_attach_file_requires_filesystem() {
    let config = VaultConfig {
        storage_root: Some(PathBuf::from("/nowhere")),
        ..Default::default()
    };
    let mut vault = Vault::open(NullFileSystem::new(), MemoryStore::new(), &config).unwrap();

    // Records still work without a filesystem; attachments cannot.
    let note = vault.create_note(None).unwrap();
    assert!(vault.note(&note.id).unwrap().is_some());
    assert!(vault.note_path(&note.id).is_none());
    assert!(matches!(
        vault.attach_file(&note.id, "a.png", b"x"),
        Err(VaultError::Unavailable)
    ));
}

#[test]
fn test_folder_lifecycle() {
    let (_tmp, root, mut vault) = setup();

    let folder = vault.create_folder("Projects").unwrap();
    assert!(root.join("Projects").is_dir());

    let renamed = vault.rename_folder(&folder.id, "Archive").unwrap();
    assert_eq!(renamed.name, "Archive");
    assert!(root.join("Archive").is_dir());
    assert!(!root.join("Projects").exists());

    let trashed = vault.trash_folder(&folder.id).unwrap();
    assert!(trashed.is_deleted);
    assert!(root.join("Trash").join("Archive").is_dir());
    assert!(!root.join("Archive").exists());

    let restored = vault.restore_folder(&folder.id).unwrap();
    assert!(!restored.is_deleted);
    assert!(root.join("Archive").is_dir());
    assert!(!root.join("Trash").join("Archive").exists());
}

#[test]
fn test_purge_folder_takes_contained_note_records() {
    let (_tmp, root, mut vault) = setup();
    let folder = vault.create_folder("Work").unwrap();
    let inside = vault.create_note(Some(&folder.id)).unwrap();
    let outside = vault.create_note(None).unwrap();

    vault.purge_folder(&folder.id).unwrap();

    assert!(!root.join("Work").exists());
    assert!(vault.folder(&folder.id).unwrap().is_none());
    assert!(vault.note(&inside.id).unwrap().is_none());
    assert!(vault.note(&outside.id).unwrap().is_some());
}

#[test]
fn test_purge_folder_reaches_into_trash() {
    let (_tmp, root, mut vault) = setup();
    let folder = vault.create_folder("Work").unwrap();
    vault.trash_folder(&folder.id).unwrap();
    assert!(root.join("Trash").join("Work").is_dir());

    vault.purge_folder(&folder.id).unwrap();

    assert!(!root.join("Trash").join("Work").exists());
    assert!(vault.folder(&folder.id).unwrap().is_none());
}

#[test]
fn test_rename_folder_onto_existing_directory_refused() {
    let (_tmp, root, mut vault) = setup();
    let keep = vault.create_folder("Keep").unwrap();
    vault.create_folder("Target").unwrap();

    let result = vault.rename_folder(&keep.id, "Target");
    assert!(matches!(result, Err(VaultError::IdentityConflict(_))));

    // Nothing moved, nothing renamed.
    assert!(root.join("Keep").is_dir());
    assert_eq!(vault.folder(&keep.id).unwrap().unwrap().name, "Keep");
}
