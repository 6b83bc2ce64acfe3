use std::sync::Arc;

use tokio::sync::{watch, OnceCell};
use tracing::{debug, info};

use crate::{
    DriveError, DriveResult, DriveStore, FileMetadata, FileQuery, FolderId, RemoteFolder,
    RemoteOperation, DEFAULT_FOLDER_DESCRIPTION,
};

/// Finds the folder with a given title, creating it under the storage root
/// when none exists.
pub struct FolderResolver {
    store: Arc<dyn DriveStore>,
    description: String,
}

impl FolderResolver {
    pub fn new(store: Arc<dyn DriveStore>) -> Self {
        Self {
            store,
            description: DEFAULT_FOLDER_DESCRIPTION.to_string(),
        }
    }

    /// Description given to folders this resolver creates
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Find-or-create the folder titled `title`.
    ///
    /// Titles match exactly and case-sensitively. With several matches the
    /// first one in listing order wins.
    pub async fn resolve(&self, title: &str) -> DriveResult<RemoteFolder> {
        if title.is_empty() {
            return Err(DriveError::invalid("Folder title must not be empty"));
        }

        if let Some(existing) = self.find(title).await? {
            debug!("Found existing folder '{}' ({})", title, existing.id);
            return Ok(existing);
        }

        let metadata = FileMetadata::folder(title, self.description.clone());
        let created = self
            .store
            .insert(metadata, None)
            .await
            .map_err(|e| e.into_remote(RemoteOperation::Insert))?;
        info!("Created folder '{}' ({}) under the storage root", title, created.id);
        Ok(RemoteFolder::from(created))
    }

    async fn find(&self, title: &str) -> DriveResult<Option<RemoteFolder>> {
        let query = FileQuery::folders_titled(title);
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .store
                .list(&query, page_token.as_deref())
                .await
                .map_err(|e| e.into_remote(RemoteOperation::List))?;

            let next = page.next_token().map(str::to_string);
            // The service's title filter is not guaranteed to be exact
            if let Some(hit) = page
                .items
                .into_iter()
                .find(|f| f.title == title && f.is_folder())
            {
                return Ok(Some(RemoteFolder::from(hit)));
            }

            match next {
                Some(token) => page_token = Some(token),
                None => return Ok(None),
            }
        }
    }
}

/// Outcome of the session's folder resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderState {
    Pending,
    Resolved(FolderId),
    Failed(String),
}

/// Read side of the session's target folder.
///
/// The id is written at most once. [`TargetFolder::get`] never waits, so an
/// upload issued before resolution finishes goes to the storage root;
/// [`TargetFolder::wait`] waits for the outcome.
#[derive(Clone)]
pub struct TargetFolder {
    title: Arc<str>,
    cell: Arc<OnceCell<FolderId>>,
    state: watch::Receiver<FolderState>,
}

/// Write side, owned by the resolution task
pub struct TargetFolderSlot {
    title: Arc<str>,
    cell: Arc<OnceCell<FolderId>>,
    state: watch::Sender<FolderState>,
}

impl TargetFolder {
    /// A pending target and the slot that settles it
    pub fn pending<S: Into<String>>(title: S) -> (Self, TargetFolderSlot) {
        let title: Arc<str> = Arc::from(title.into());
        let cell = Arc::new(OnceCell::new());
        let (tx, rx) = watch::channel(FolderState::Pending);
        (
            Self {
                title: title.clone(),
                cell: cell.clone(),
                state: rx,
            },
            TargetFolderSlot {
                title,
                cell,
                state: tx,
            },
        )
    }

    /// An already settled target; `None` means uploads go to the storage root
    pub fn fixed<S: Into<String>>(title: S, folder: Option<FolderId>) -> Self {
        let (target, slot) = Self::pending(title);
        match folder {
            Some(id) => slot.resolve(id),
            None => slot.fail("no target folder"),
        }
        target
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The folder id, if resolution has completed
    pub fn get(&self) -> Option<&FolderId> {
        self.cell.get()
    }

    pub fn state(&self) -> FolderState {
        self.state.borrow().clone()
    }

    /// Wait for resolution to settle
    pub async fn wait(&self) -> DriveResult<FolderId> {
        if let Some(id) = self.cell.get() {
            return Ok(id.clone());
        }

        let mut rx = self.state.clone();
        let settled = rx
            .wait_for(|s| !matches!(s, FolderState::Pending))
            .await
            .map(|state| (*state).clone());

        match settled {
            Ok(FolderState::Resolved(id)) => Ok(id),
            Ok(FolderState::Failed(reason)) => {
                Err(DriveError::folder_resolution(self.title.as_ref(), reason))
            }
            Ok(FolderState::Pending) | Err(_) => Err(DriveError::folder_resolution(
                self.title.as_ref(),
                "resolution task ended without a result",
            )),
        }
    }
}

impl std::fmt::Debug for TargetFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetFolder")
            .field("title", &self.title)
            .field("id", &self.cell.get())
            .finish()
    }
}

impl TargetFolderSlot {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Publish the resolved id. Consumes the slot, so it happens once.
    pub fn resolve(self, id: FolderId) {
        if self.cell.set(id.clone()).is_err() {
            debug!("Target folder for '{}' was already set", self.title);
        }
        self.state.send_replace(FolderState::Resolved(id));
    }

    /// Publish a failure; the id stays unset for good
    pub fn fail<S: Into<String>>(self, reason: S) {
        self.state.send_replace(FolderState::Failed(reason.into()));
    }

    pub fn settle(self, result: &DriveResult<FolderId>) {
        match result {
            Ok(id) => self.resolve(id.clone()),
            Err(e) => self.fail(e.to_string()),
        }
    }
}
