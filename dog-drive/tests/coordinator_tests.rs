mod common;

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};
use tracing_test::traced_test;

use dog_drive::{
    ContentTypes, DefaultUploadCoordinator, DriveError, FileDescriptor, FileId, FileQuery,
    FolderId, MemoryDriveStore, ParentReference, RemoteOperation, StaticRegistry, TargetFolder,
    UploadCoordinator, UploadOptions, DEFAULT_INSERT_DESCRIPTION, DEFAULT_UPDATE_DESCRIPTION,
    UNKNOWN_CONTENT_TYPE,
};

use common::{remote_file, write_file, FOLDER_TITLE};

fn coordinator(store: &MemoryDriveStore, folder: Option<&str>) -> DefaultUploadCoordinator {
    let target = TargetFolder::fixed(FOLDER_TITLE, folder.map(FolderId::from));
    DefaultUploadCoordinator::new(Arc::new(store.clone()), target, "store-7")
}

/// C1. Insert places the file in the target folder with derived metadata
#[tokio::test]
async fn test_insert_targets_folder() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, Some("folder-1"));
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "orders.csv", b"id,total\n1,9.50\n");

    let descriptor = assert_ok!(uploads.insert(&path, UploadOptions::new()).await);

    let record = store.file(&descriptor.id).unwrap();
    assert_eq!(descriptor.title, "orders.csv");
    assert_eq!(record.parents, vec![ParentReference::new(FolderId::from("folder-1"))]);
    assert_eq!(record.description.as_deref(), Some(DEFAULT_INSERT_DESCRIPTION));
    assert_eq!(record.mime_type.as_deref(), Some("text/csv"));
    assert_eq!(store.content(&descriptor.id).unwrap().as_ref(), b"id,total\n1,9.50\n");
}

/// C2. Without a target folder the file lands at the storage root
#[tokio::test]
async fn test_insert_without_folder_goes_to_root() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, None);
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "notes.txt", b"hello");

    let descriptor = assert_ok!(uploads.insert(&path, UploadOptions::new()).await);

    assert!(store.file(&descriptor.id).unwrap().parents.is_empty());
}

/// C3. Missing local file fails before any remote call
#[tokio::test]
#[traced_test]
async fn test_missing_local_file_makes_no_remote_call() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, Some("folder-1"));

    let inserted = uploads
        .insert("./does-not-exist.bin".as_ref(), UploadOptions::new())
        .await;
    let updated = uploads
        .update(
            &FileId::from("existing"),
            "./does-not-exist.bin".as_ref(),
            UploadOptions::new().with_content(&b"raw"[..]),
        )
        .await;

    assert!(matches!(inserted, Err(DriveError::LocalFileMissing { .. })));
    assert!(matches!(updated, Err(DriveError::LocalFileMissing { .. })));
    assert_eq!(store.total_calls(), 0);
    assert!(logs_contain("does-not-exist.bin"));
}

/// C4. Raw content overrides the file's bytes; options override title and type
#[tokio::test]
async fn test_options_override_content_and_metadata() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, None);
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "photo.jpg", b"on disk");

    let options = UploadOptions::new()
        .with_content(&b"in memory"[..])
        .with_title("cover.jpg")
        .with_mime_type("image/x-custom")
        .with_description("thumbnail cache");
    let descriptor = assert_ok!(uploads.insert(&path, options).await);

    let record = store.file(&descriptor.id).unwrap();
    assert_eq!(descriptor.title, "cover.jpg");
    assert_eq!(record.mime_type.as_deref(), Some("image/x-custom"));
    assert_eq!(record.description.as_deref(), Some("thumbnail cache"));
    assert_eq!(store.content(&descriptor.id).unwrap().as_ref(), b"in memory");
}

/// C5. Unregistered extensions are sent as application/unknown
#[tokio::test]
async fn test_unknown_extension_uses_fallback_type() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, None)
        .with_content_types(ContentTypes::new(StaticRegistry::new().with(".csv", "text/csv")));
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "dump.zzqxv", b"\x00\x01");

    let descriptor = assert_ok!(uploads.insert(&path, UploadOptions::new()).await);

    assert_eq!(
        store.file(&descriptor.id).unwrap().mime_type.as_deref(),
        Some(UNKNOWN_CONTENT_TYPE)
    );
}

/// C6. Update rewrites metadata and records a new revision by default
#[tokio::test]
async fn test_update_records_new_revision() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, Some("folder-1"));
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "ledger.txt", b"v1");
    let original = assert_ok!(uploads.insert(&path, UploadOptions::new()).await);

    std::fs::write(&path, b"v2").unwrap();
    let updated = assert_ok!(uploads.update(&original.id, &path, UploadOptions::new()).await);

    assert_eq!(updated.id, original.id);
    assert_eq!(store.revision_count(&original.id), 2);
    assert_eq!(store.content(&original.id).unwrap().as_ref(), b"v2");
    assert_eq!(
        store.file(&original.id).unwrap().description.as_deref(),
        Some(DEFAULT_UPDATE_DESCRIPTION)
    );
}

/// C7. Update without a new revision overwrites the head revision
#[tokio::test]
async fn test_update_can_overwrite_revision() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, None);
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "ledger.txt", b"v1");
    let original = assert_ok!(uploads.insert(&path, UploadOptions::new()).await);

    std::fs::write(&path, b"v2").unwrap();
    assert_ok!(
        uploads
            .update(&original.id, &path, UploadOptions::new().overwrite_revision())
            .await
    );

    assert_eq!(store.revision_count(&original.id), 1);
    assert_eq!(store.content(&original.id).unwrap().as_ref(), b"v2");
}

/// C8. keep_remote_metadata preserves the record's parents
#[tokio::test]
async fn test_update_keeping_remote_metadata() {
    let store = MemoryDriveStore::new();
    let mut existing = remote_file("f-1", "report.pdf");
    existing.parents = vec![ParentReference::new(FolderId::from("elsewhere"))];
    store.seed(existing);
    let uploads = coordinator(&store, Some("folder-1"));
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "report.pdf", b"%PDF");

    assert_ok!(
        uploads
            .update(
                &FileId::from("f-1"),
                &path,
                UploadOptions::new().keep_remote_metadata().with_title("Q3 report.pdf"),
            )
            .await
    );

    let record = store.file(&FileId::from("f-1")).unwrap();
    assert_eq!(record.title, "Q3 report.pdf");
    assert_eq!(record.parents, vec![ParentReference::new(FolderId::from("elsewhere"))]);
    assert_eq!(store.calls(RemoteOperation::Get), 1);
}

/// C9. Remote failures are typed, logged, and attempted once
#[tokio::test]
#[traced_test]
async fn test_remote_failure_is_reported_once() {
    let store = MemoryDriveStore::new();
    store.fail_always(RemoteOperation::Insert);
    let uploads = coordinator(&store, None);
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "a.txt", b"a");

    let err = assert_err!(uploads.insert(&path, UploadOptions::new()).await);

    assert_eq!(err.operation(), Some(RemoteOperation::Insert));
    assert_eq!(store.calls(RemoteOperation::Insert), 1);
    assert!(logs_contain("Insert failed"));
    assert!(logs_contain("store-7"));
}

/// C10. Listing accumulates pages in order
#[tokio::test]
async fn test_list_accumulates_pages() {
    let store = MemoryDriveStore::new().with_page_size(3);
    for i in 1..=5 {
        store.seed(remote_file(&format!("f-{}", i), &format!("file-{}.txt", i)));
    }
    let uploads = coordinator(&store, None);

    let listing = uploads.list(FileQuery::all()).await;

    assert!(listing.is_complete());
    assert_eq!(listing.pages, 2);
    let ids: Vec<&str> = listing.files.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["f-1", "f-2", "f-3", "f-4", "f-5"]);
    assert_eq!(store.calls(RemoteOperation::List), 2);
}

/// C11. A failing page truncates the listing but keeps earlier pages
#[tokio::test]
#[traced_test]
async fn test_list_failure_keeps_accumulated_pages() {
    let store = MemoryDriveStore::new().with_page_size(3);
    for i in 1..=5 {
        store.seed(remote_file(&format!("f-{}", i), &format!("file-{}.txt", i)));
    }
    store.fail_after(RemoteOperation::List, 1);
    let uploads = coordinator(&store, None);

    let listing = uploads.list(FileQuery::all()).await;

    assert!(!listing.is_complete());
    assert_eq!(listing.len(), 3);
    assert!(listing.interrupted.as_ref().unwrap().is_remote());
    assert!(logs_contain("List failed"));
}

/// C12. Trash returns the trashed record
#[tokio::test]
async fn test_trash_returns_descriptor() {
    let store = MemoryDriveStore::new();
    store.seed(remote_file("f-1", "old.log"));
    let uploads = coordinator(&store, None);

    let trashed: FileDescriptor = assert_ok!(uploads.trash(&FileId::from("f-1")).await);

    assert_eq!(trashed.id, FileId::from("f-1"));
    assert!(store.file(&FileId::from("f-1")).unwrap().is_trashed());
}

/// C13. Delete removes the record; a failed delete is logged, not silent
#[tokio::test]
#[traced_test]
async fn test_delete_and_logged_delete_failure() {
    let store = MemoryDriveStore::new();
    store.seed(remote_file("f-1", "old.log"));
    let uploads = coordinator(&store, None);

    assert_ok!(uploads.delete(&FileId::from("f-1")).await);
    assert!(store.file(&FileId::from("f-1")).is_none());

    let err = assert_err!(uploads.delete(&FileId::from("f-1")).await);
    assert_eq!(err.operation(), Some(RemoteOperation::Delete));
    assert!(logs_contain("Delete failed for f-1"));
}

/// C14. A directory is not a local file, with or without raw content
#[tokio::test]
async fn test_directory_path_is_missing_file() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, Some("folder-1"));
    let dir = tempfile::tempdir().unwrap();

    let plain = uploads.insert(dir.path(), UploadOptions::new()).await;
    let with_content = uploads
        .insert(dir.path(), UploadOptions::new().with_content(&b"x"[..]))
        .await;
    let updated = uploads
        .update(&FileId::from("existing"), dir.path(), UploadOptions::new())
        .await;

    assert!(matches!(plain, Err(DriveError::LocalFileMissing { .. })));
    assert!(matches!(with_content, Err(DriveError::LocalFileMissing { .. })));
    assert!(matches!(updated, Err(DriveError::LocalFileMissing { .. })));
    assert_eq!(store.total_calls(), 0);
}

/// C15. A path that can't be inspected is an I/O error, not a missing file
#[tokio::test]
async fn test_unreadable_path_is_io_error() {
    let store = MemoryDriveStore::new();
    let uploads = coordinator(&store, None);
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "plain.txt", b"data");
    // A regular file used as a directory fails with ENOTDIR
    let nested = file.join("child.txt");

    let err = assert_err!(uploads.insert(&nested, UploadOptions::new()).await);

    assert!(matches!(err, DriveError::Io { .. }));
    assert_eq!(store.total_calls(), 0);
}
