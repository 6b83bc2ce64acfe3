use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{Content, DriveResult, FileDescriptor, FileId, FileListing, FileMetadata, FileQuery, FolderId};

/// Coordinates inserts, updates and the other file-level calls of a session
#[async_trait]
pub trait UploadCoordinator: Send + Sync {
    /// Create a new remote file from a local one
    async fn insert(&self, path: &Path, options: UploadOptions) -> DriveResult<FileDescriptor>;

    /// Replace an existing remote file's metadata and content
    async fn update(
        &self,
        file_id: &FileId,
        path: &Path,
        options: UploadOptions,
    ) -> DriveResult<FileDescriptor>;

    /// Page through every record matching `query`
    async fn list(&self, query: FileQuery) -> FileListing;

    /// Move a remote file to the trash
    async fn trash(&self, file_id: &FileId) -> DriveResult<FileDescriptor>;

    /// Permanently delete a remote file
    async fn delete(&self, file_id: &FileId) -> DriveResult<()>;
}

/// Per-call options for inserts and updates
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Description to store; `None` uses the session default for the call
    pub description: Option<String>,

    /// Raw content sent verbatim instead of the file's bytes
    pub content: Option<Bytes>,

    /// Record a new content revision on update instead of overwriting
    pub new_revision: bool,

    /// Title to store; `None` uses the file's base name
    pub title: Option<String>,

    /// MIME type to store; `None` resolves it from the path
    pub mime_type: Option<String>,

    /// On update, fetch the remote record first and keep its parents
    pub keep_remote_metadata: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            description: None,
            content: None,
            new_revision: true,
            title: None,
            mime_type: None,
            keep_remote_metadata: false,
        }
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_content<B: Into<Bytes>>(mut self, content: B) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Overwrite the head revision instead of recording a new one
    pub fn overwrite_revision(mut self) -> Self {
        self.new_revision = false;
        self
    }

    pub fn with_new_revision(mut self, new_revision: bool) -> Self {
        self.new_revision = new_revision;
        self
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn keep_remote_metadata(mut self) -> Self {
        self.keep_remote_metadata = true;
        self
    }
}

/// A local file checked and loaded, ready to send
#[derive(Debug, Clone)]
pub struct UploadIntent {
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    pub content: Content,
}

impl UploadIntent {
    /// Metadata for this upload, parented under `folder` when one is known
    pub fn metadata(&self, folder: Option<&FolderId>) -> FileMetadata {
        let metadata = FileMetadata::new(self.title.clone())
            .with_description(self.description.clone())
            .with_mime_type(self.content.mime_type.clone());
        match folder {
            Some(folder) => metadata.with_parent(folder.clone()),
            None => metadata,
        }
    }
}
