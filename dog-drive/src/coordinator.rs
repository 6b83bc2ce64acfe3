use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    Content, ContentTypes, DriveError, DriveResult, DriveStore, FileDescriptor, FileId,
    FileListing, FileQuery, RemoteOperation, TargetFolder, UploadCoordinator, UploadIntent,
    UploadOptions, DEFAULT_INSERT_DESCRIPTION, DEFAULT_UPDATE_DESCRIPTION,
};

/// Upload coordinator that sends every call straight to a [`DriveStore`].
///
/// Each call is attempted once. Failures are logged with the client id and
/// the call's subject, then returned.
pub struct DefaultUploadCoordinator {
    store: Arc<dyn DriveStore>,
    content_types: ContentTypes,
    target: TargetFolder,
    client_id: String,
    insert_description: String,
    update_description: String,
}

impl DefaultUploadCoordinator {
    pub fn new<S: Into<String>>(store: Arc<dyn DriveStore>, target: TargetFolder, client_id: S) -> Self {
        Self {
            store,
            content_types: ContentTypes::default(),
            target,
            client_id: client_id.into(),
            insert_description: DEFAULT_INSERT_DESCRIPTION.to_string(),
            update_description: DEFAULT_UPDATE_DESCRIPTION.to_string(),
        }
    }

    pub fn with_content_types(mut self, content_types: ContentTypes) -> Self {
        self.content_types = content_types;
        self
    }

    /// Descriptions used when a call doesn't set one
    pub fn with_descriptions<I: Into<String>, U: Into<String>>(mut self, insert: I, update: U) -> Self {
        self.insert_description = insert.into();
        self.update_description = update.into();
        self
    }

    pub fn target(&self) -> &TargetFolder {
        &self.target
    }

    /// Check the local file and load what will be sent.
    ///
    /// The path must be a regular file even when the options carry raw
    /// content. Directories count as missing; a stat that fails for any
    /// reason other than not-found is an I/O error.
    async fn prepare(
        &self,
        path: &Path,
        options: UploadOptions,
        default_description: &str,
    ) -> DriveResult<UploadIntent> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(DriveError::local_missing(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DriveError::local_missing(path))
            }
            Err(e) => return Err(e.into()),
        }

        let title = match options.title {
            Some(title) => title,
            None => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| DriveError::invalid(format!("Path has no file name: {}", path.display())))?,
        };
        let mime_type = options
            .mime_type
            .unwrap_or_else(|| self.content_types.resolve(path));
        let bytes = match options.content {
            Some(bytes) => bytes,
            None => tokio::fs::read(path).await?.into(),
        };

        Ok(UploadIntent {
            path: path.to_path_buf(),
            title,
            description: options
                .description
                .unwrap_or_else(|| default_description.to_string()),
            content: Content::new(bytes, mime_type),
        })
    }

    fn log_failure(&self, operation: &str, subject: &str, err: &DriveError) {
        error!(
            client_id = %self.client_id,
            "{} failed for {}: {}",
            operation, subject, err
        );
    }
}

#[async_trait]
impl UploadCoordinator for DefaultUploadCoordinator {
    #[instrument(skip(self, options), fields(client_id = %self.client_id))]
    async fn insert(&self, path: &Path, options: UploadOptions) -> DriveResult<FileDescriptor> {
        let subject = path.display().to_string();
        let intent = match self.prepare(path, options, &self.insert_description).await {
            Ok(intent) => intent,
            Err(e) => {
                self.log_failure("Insert", &subject, &e);
                return Err(e);
            }
        };

        let folder = self.target.get();
        if folder.is_none() {
            warn!("Target folder '{}' not resolved; inserting {} at the storage root", self.target.title(), subject);
        }

        let metadata = intent.metadata(folder);
        let size = intent.content.len();
        match self.store.insert(metadata, Some(intent.content)).await {
            Ok(file) => {
                info!("Inserted {} as {} ({} bytes)", subject, file.id, size);
                Ok(FileDescriptor::from(file))
            }
            Err(e) => {
                let e = e.into_remote(RemoteOperation::Insert);
                self.log_failure("Insert", &subject, &e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self, options), fields(client_id = %self.client_id))]
    async fn update(
        &self,
        file_id: &FileId,
        path: &Path,
        options: UploadOptions,
    ) -> DriveResult<FileDescriptor> {
        let subject = format!("{} ({})", file_id, path.display());
        let new_revision = options.new_revision;
        let keep_remote_metadata = options.keep_remote_metadata;

        let intent = match self.prepare(path, options, &self.update_description).await {
            Ok(intent) => intent,
            Err(e) => {
                self.log_failure("Update", &subject, &e);
                return Err(e);
            }
        };

        let mut metadata = intent.metadata(self.target.get());
        if keep_remote_metadata {
            match self.store.get(file_id).await {
                Ok(current) => metadata = metadata.with_parents(current.parents),
                Err(e) => {
                    let e = e.into_remote(RemoteOperation::Get);
                    self.log_failure("Update", &subject, &e);
                    return Err(e);
                }
            }
        }

        match self
            .store
            .update(file_id, metadata, Some(intent.content), new_revision)
            .await
        {
            Ok(file) => {
                info!("Updated {} (new revision: {})", subject, new_revision);
                Ok(FileDescriptor::from(file))
            }
            Err(e) => {
                let e = e.into_remote(RemoteOperation::Update);
                self.log_failure("Update", &subject, &e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(client_id = %self.client_id))]
    async fn list(&self, query: FileQuery) -> FileListing {
        let mut files = Vec::new();
        let mut pages = 0;
        let mut page_token: Option<String> = None;

        loop {
            match self.store.list(&query, page_token.as_deref()).await {
                Ok(page) => {
                    pages += 1;
                    page_token = page.next_token().map(str::to_string);
                    debug!("Listed page {} with {} records", pages, page.items.len());
                    files.extend(page.items.iter().map(FileDescriptor::from));
                }
                Err(e) => {
                    let e = e.into_remote(RemoteOperation::List);
                    self.log_failure("List", &format!("page {}", pages + 1), &e);
                    return FileListing {
                        files,
                        pages,
                        interrupted: Some(e),
                    };
                }
            }

            if page_token.is_none() {
                return FileListing {
                    files,
                    pages,
                    interrupted: None,
                };
            }
        }
    }

    #[instrument(skip(self), fields(client_id = %self.client_id))]
    async fn trash(&self, file_id: &FileId) -> DriveResult<FileDescriptor> {
        match self.store.trash(file_id).await {
            Ok(file) => {
                info!("Trashed {}", file_id);
                Ok(FileDescriptor::from(file))
            }
            Err(e) => {
                let e = e.into_remote(RemoteOperation::Trash);
                self.log_failure("Trash", file_id.as_str(), &e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(client_id = %self.client_id))]
    async fn delete(&self, file_id: &FileId) -> DriveResult<()> {
        match self.store.delete(file_id).await {
            Ok(()) => {
                info!("Deleted {}", file_id);
                Ok(())
            }
            Err(e) => {
                let e = e.into_remote(RemoteOperation::Delete);
                self.log_failure("Delete", file_id.as_str(), &e);
                Err(e)
            }
        }
    }
}
