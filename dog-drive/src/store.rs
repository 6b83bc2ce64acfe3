use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Content, DriveConfig, DriveResult, FileId, FileMetadata, FilePage, FileQuery, RemoteFile,
};

/// Remote drive operations - implemented by every transport.
///
/// Each method is a single remote call. Implementations report failures as
/// [`crate::DriveError::RemoteOperationFailed`] where they can; the coordinator
/// normalizes anything else.
#[async_trait]
pub trait DriveStore: Send + Sync {
    /// Fetch one page of records matching `query`
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> DriveResult<FilePage>;

    /// Fetch a single record
    async fn get(&self, file_id: &FileId) -> DriveResult<RemoteFile>;

    /// Create a record, with content when given
    async fn insert(
        &self,
        metadata: FileMetadata,
        content: Option<Content>,
    ) -> DriveResult<RemoteFile>;

    /// Rewrite a record's metadata, and its content when given.
    ///
    /// `new_revision = false` overwrites the head revision instead of
    /// recording a new one.
    async fn update(
        &self,
        file_id: &FileId,
        metadata: FileMetadata,
        content: Option<Content>,
        new_revision: bool,
    ) -> DriveResult<RemoteFile>;

    /// Permanently delete a record, skipping the trash
    async fn delete(&self, file_id: &FileId) -> DriveResult<()>;

    /// Move a record to the trash
    async fn trash(&self, file_id: &FileId) -> DriveResult<RemoteFile>;
}

#[async_trait]
impl<S: DriveStore + ?Sized> DriveStore for Arc<S> {
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> DriveResult<FilePage> {
        (**self).list(query, page_token).await
    }

    async fn get(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        (**self).get(file_id).await
    }

    async fn insert(
        &self,
        metadata: FileMetadata,
        content: Option<Content>,
    ) -> DriveResult<RemoteFile> {
        (**self).insert(metadata, content).await
    }

    async fn update(
        &self,
        file_id: &FileId,
        metadata: FileMetadata,
        content: Option<Content>,
        new_revision: bool,
    ) -> DriveResult<RemoteFile> {
        (**self).update(file_id, metadata, content, new_revision).await
    }

    async fn delete(&self, file_id: &FileId) -> DriveResult<()> {
        (**self).delete(file_id).await
    }

    async fn trash(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        (**self).trash(file_id).await
    }
}

/// Turns session credentials into an authenticated store.
///
/// Token acquisition and refresh live behind this trait; the session only
/// hands over its [`DriveConfig`].
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn connect(&self, config: &DriveConfig) -> DriveResult<Arc<dyn DriveStore>>;
}
