use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::{
    ContentTypes, CredentialProvider, DefaultUploadCoordinator, DriveConfig, DriveError,
    DriveResult, DriveStore, FileDescriptor, FileId, FileListing, FileQuery, FolderId,
    FolderResolver, FolderState, TargetFolder, UploadCoordinator, UploadOptions,
};

/// A drive session - what services embed to back files up into one folder.
///
/// Construction starts resolving the configured folder in the background and
/// returns right away. Uploads made before resolution finishes go to the
/// storage root; call [`DriveSession::wait_for_folder`] first when placement
/// matters.
pub struct DriveSession {
    store: Arc<dyn DriveStore>,
    uploads: Arc<dyn UploadCoordinator>,
    target: TargetFolder,
    content_types: ContentTypes,
    config: Arc<DriveConfig>,
}

impl DriveSession {
    /// Create a session over `store` and start resolving the target folder.
    ///
    /// Must be called within a tokio runtime.
    pub fn new<S: DriveStore + 'static>(store: S, config: DriveConfig) -> DriveResult<Self> {
        Self::with_store(Arc::new(store), config)
    }

    /// Authenticate through `provider`, then behave like [`DriveSession::new`]
    pub async fn connect<P>(provider: &P, config: DriveConfig) -> DriveResult<Self>
    where
        P: CredentialProvider + ?Sized,
    {
        config.validate()?;
        let store = provider.connect(&config).await.map_err(|e| {
            error!(client_id = %config.client_id, "Could not connect to the drive: {}", e);
            e
        })?;
        Self::with_store(store, config)
    }

    /// Create a session over an already shared store
    pub fn with_store(store: Arc<dyn DriveStore>, config: DriveConfig) -> DriveResult<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| DriveError::invalid("A drive session must be created inside a tokio runtime"))?;

        let config = Arc::new(config);
        let (target, slot) = TargetFolder::pending(config.folder_title.clone());

        let resolver = FolderResolver::new(store.clone())
            .with_description(config.folder_description.clone());
        let task_config = config.clone();
        runtime.spawn(async move {
            let result = resolver
                .resolve(&task_config.folder_title)
                .await
                .map(|folder| folder.id);
            match &result {
                Ok(id) => info!(
                    client_id = %task_config.client_id,
                    "Target folder '{}' resolved to {}",
                    task_config.folder_title, id
                ),
                Err(e) => error!(
                    client_id = %task_config.client_id,
                    "Folder resolution for '{}' failed, uploads will go to the storage root: {}",
                    task_config.folder_title, e
                ),
            }
            slot.settle(&result);
        });

        let content_types = ContentTypes::default();
        let uploads = Self::build_coordinator(&store, &target, &content_types, &config);

        Ok(Self {
            store,
            uploads,
            target,
            content_types,
            config,
        })
    }

    fn build_coordinator(
        store: &Arc<dyn DriveStore>,
        target: &TargetFolder,
        content_types: &ContentTypes,
        config: &DriveConfig,
    ) -> Arc<dyn UploadCoordinator> {
        Arc::new(
            DefaultUploadCoordinator::new(store.clone(), target.clone(), config.client_id.clone())
                .with_content_types(content_types.clone())
                .with_descriptions(
                    config.insert_description.clone(),
                    config.update_description.clone(),
                ),
        )
    }

    /// Use a different extension → MIME registry
    pub fn with_content_types(mut self, content_types: ContentTypes) -> Self {
        self.uploads =
            Self::build_coordinator(&self.store, &self.target, &content_types, &self.config);
        self.content_types = content_types;
        self
    }

    /// Replace the upload coordinator
    pub fn with_uploads<U: UploadCoordinator + 'static>(mut self, coordinator: U) -> Self {
        self.uploads = Arc::new(coordinator);
        self
    }

    /// Upload a local file as a new remote file
    pub async fn insert<P: AsRef<Path>>(
        &self,
        path: P,
        options: UploadOptions,
    ) -> DriveResult<FileDescriptor> {
        self.uploads.insert(path.as_ref(), options).await
    }

    /// [`DriveSession::insert`] with default options
    pub async fn upload<P: AsRef<Path>>(&self, path: P) -> DriveResult<FileDescriptor> {
        self.insert(path, UploadOptions::default()).await
    }

    /// Replace the metadata and content of `file_id` from a local file
    pub async fn update<P: AsRef<Path>>(
        &self,
        file_id: &FileId,
        path: P,
        options: UploadOptions,
    ) -> DriveResult<FileDescriptor> {
        self.uploads.update(file_id, path.as_ref(), options).await
    }

    /// Every file visible to the session
    pub async fn list_files(&self) -> FileListing {
        self.uploads.list(FileQuery::all()).await
    }

    /// Files matching `query`
    pub async fn list_query(&self, query: FileQuery) -> FileListing {
        self.uploads.list(query).await
    }

    /// Files inside the target folder; waits for folder resolution
    pub async fn list_folder(&self) -> DriveResult<FileListing> {
        let folder = self.wait_for_folder().await?;
        Ok(self.uploads.list(FileQuery::all().in_folder(folder)).await)
    }

    pub async fn trash(&self, file_id: &FileId) -> DriveResult<FileDescriptor> {
        self.uploads.trash(file_id).await
    }

    pub async fn delete(&self, file_id: &FileId) -> DriveResult<()> {
        self.uploads.delete(file_id).await
    }

    /// The target folder id, if resolution has completed
    pub fn target_folder(&self) -> Option<FolderId> {
        self.target.get().cloned()
    }

    pub fn folder_state(&self) -> FolderState {
        self.target.state()
    }

    /// Wait until folder resolution settles
    pub async fn wait_for_folder(&self) -> DriveResult<FolderId> {
        self.target.wait().await
    }

    /// MIME type the session would send for `path`
    pub fn content_type<P: AsRef<Path>>(&self, path: P) -> String {
        self.content_types.resolve(path)
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }
}
