#![allow(dead_code)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::watch;

use dog_drive::{
    Content, DriveConfig, DriveResult, DriveStore, FileId, FileMetadata, FilePage, FileQuery,
    MemoryDriveStore, RemoteFile, FOLDER_MIME_TYPE,
};

pub const FOLDER_TITLE: &str = "Store Backups";

/// Test factory functions
pub fn create_test_config() -> DriveConfig {
    DriveConfig::new(
        "store-7",
        "owner@example.com",
        "uploader@example.iam.gserviceaccount.com",
        "/etc/keys/uploader.p12",
        FOLDER_TITLE,
    )
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write test file");
    path
}

pub fn remote_file(id: &str, title: &str) -> RemoteFile {
    RemoteFile::new(FileId::from(id), title)
}

pub fn remote_folder(id: &str, title: &str) -> RemoteFile {
    let mut folder = remote_file(id, title);
    folder.mime_type = Some(FOLDER_MIME_TYPE.to_string());
    folder
}

/// Store whose listings block until the gate is opened
#[derive(Clone)]
pub struct GatedStore {
    pub inner: MemoryDriveStore,
    open_tx: watch::Sender<bool>,
    open_rx: watch::Receiver<bool>,
}

impl GatedStore {
    pub fn new(inner: MemoryDriveStore) -> Self {
        let (open_tx, open_rx) = watch::channel(false);
        Self {
            inner,
            open_tx,
            open_rx,
        }
    }

    pub fn open(&self) {
        self.open_tx.send_replace(true);
    }
}

#[async_trait]
impl DriveStore for GatedStore {
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> DriveResult<FilePage> {
        let mut rx = self.open_rx.clone();
        let _ = rx.wait_for(|open| *open).await;
        self.inner.list(query, page_token).await
    }

    async fn get(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        self.inner.get(file_id).await
    }

    async fn insert(
        &self,
        metadata: FileMetadata,
        content: Option<Content>,
    ) -> DriveResult<RemoteFile> {
        self.inner.insert(metadata, content).await
    }

    async fn update(
        &self,
        file_id: &FileId,
        metadata: FileMetadata,
        content: Option<Content>,
        new_revision: bool,
    ) -> DriveResult<RemoteFile> {
        self.inner.update(file_id, metadata, content, new_revision).await
    }

    async fn delete(&self, file_id: &FileId) -> DriveResult<()> {
        self.inner.delete(file_id).await
    }

    async fn trash(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        self.inner.trash(file_id).await
    }
}

/// Store that filters titles by prefix, the way a `contains` query would
#[derive(Clone)]
pub struct LooseTitleStore {
    pub inner: MemoryDriveStore,
}

impl LooseTitleStore {
    pub fn new(inner: MemoryDriveStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DriveStore for LooseTitleStore {
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> DriveResult<FilePage> {
        let mut relaxed = query.clone();
        relaxed.title = None;
        let mut page = self.inner.list(&relaxed, page_token).await?;
        if let Some(title) = &query.title {
            page.items.retain(|f| f.title.starts_with(title.as_str()));
        }
        Ok(page)
    }

    async fn get(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        self.inner.get(file_id).await
    }

    async fn insert(
        &self,
        metadata: FileMetadata,
        content: Option<Content>,
    ) -> DriveResult<RemoteFile> {
        self.inner.insert(metadata, content).await
    }

    async fn update(
        &self,
        file_id: &FileId,
        metadata: FileMetadata,
        content: Option<Content>,
        new_revision: bool,
    ) -> DriveResult<RemoteFile> {
        self.inner.update(file_id, metadata, content, new_revision).await
    }

    async fn delete(&self, file_id: &FileId) -> DriveResult<()> {
        self.inner.delete(file_id).await
    }

    async fn trash(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        self.inner.trash(file_id).await
    }
}
