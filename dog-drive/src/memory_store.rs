use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    Content, DriveError, DriveResult, DriveStore, FileId, FileLabels, FileMetadata, FilePage,
    FileQuery, RemoteFile, RemoteOperation,
};

/// Stored content and its revision history, oldest first
#[derive(Debug, Clone, Default)]
struct StoredContent {
    revisions: Vec<Bytes>,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: Vec<RemoteFile>,
    contents: HashMap<FileId, StoredContent>,
    calls: HashMap<RemoteOperation, usize>,
    // operation -> number of calls allowed to succeed before failing
    failures: HashMap<RemoteOperation, usize>,
}

/// In-process drive, for tests and local development.
///
/// Records keep insertion order. Listings are split into pages of
/// `page_size` with page tokens holding the next offset. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryDriveStore {
    state: Arc<Mutex<MemoryState>>,
    page_size: usize,
}

impl MemoryDriveStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            page_size: 100,
        }
    }

    /// Split listings into pages of `page_size` records
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a record as if the remote service already had it
    pub fn seed(&self, file: RemoteFile) {
        self.state.lock().files.push(file);
    }

    /// Let `successful_calls` more calls of `operation` through, then fail every one after
    pub fn fail_after(&self, operation: RemoteOperation, successful_calls: usize) {
        let mut state = self.state.lock();
        let already = state.calls.get(&operation).copied().unwrap_or(0);
        state.failures.insert(operation, already + successful_calls);
    }

    /// Fail every call of `operation` from now on
    pub fn fail_always(&self, operation: RemoteOperation) {
        self.fail_after(operation, 0);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// How many times `operation` was called, including failed calls
    pub fn calls(&self, operation: RemoteOperation) -> usize {
        self.state.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    /// Snapshot of every record, in insertion order
    pub fn files(&self) -> Vec<RemoteFile> {
        self.state.lock().files.clone()
    }

    pub fn file(&self, file_id: &FileId) -> Option<RemoteFile> {
        self.state.lock().files.iter().find(|f| &f.id == file_id).cloned()
    }

    /// Current content of a record
    pub fn content(&self, file_id: &FileId) -> Option<Bytes> {
        self.state
            .lock()
            .contents
            .get(file_id)
            .and_then(|c| c.revisions.last().cloned())
    }

    /// Number of content revisions recorded for a record
    pub fn revision_count(&self, file_id: &FileId) -> usize {
        self.state
            .lock()
            .contents
            .get(file_id)
            .map_or(0, |c| c.revisions.len())
    }

    /// Count the call and decide whether it fails
    fn begin(&self, state: &mut MemoryState, operation: RemoteOperation) -> DriveResult<()> {
        let count = state.calls.entry(operation).or_insert(0);
        *count += 1;
        match state.failures.get(&operation) {
            Some(allowed) if *count > *allowed => Err(DriveError::remote_message(
                operation,
                format!("injected {} failure", operation),
            )),
            _ => Ok(()),
        }
    }

    fn apply_metadata(file: &mut RemoteFile, metadata: FileMetadata) {
        file.title = metadata.title;
        file.description = metadata.description;
        file.mime_type = metadata.mime_type;
        file.parents = metadata.parents;
    }
}

impl Default for MemoryDriveStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(operation: RemoteOperation, file_id: &FileId) -> DriveError {
    DriveError::remote_message(operation, format!("File not found: {}", file_id))
}

#[async_trait]
impl DriveStore for MemoryDriveStore {
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> DriveResult<FilePage> {
        let mut state = self.state.lock();
        self.begin(&mut state, RemoteOperation::List)?;

        let offset = match page_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                DriveError::remote_message(RemoteOperation::List, format!("Invalid page token: {}", token))
            })?,
            None => 0,
        };

        let matching: Vec<&RemoteFile> = state.files.iter().filter(|f| query.matches(f)).collect();
        let end = offset.saturating_add(self.page_size).min(matching.len());
        let items = matching
            .get(offset..end)
            .map(|slice| slice.iter().map(|f| (*f).clone()).collect())
            .unwrap_or_default();
        let next_page_token = (end < matching.len()).then(|| end.to_string());

        Ok(FilePage::new(items, next_page_token))
    }

    async fn get(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        let mut state = self.state.lock();
        self.begin(&mut state, RemoteOperation::Get)?;

        state
            .files
            .iter()
            .find(|f| &f.id == file_id)
            .cloned()
            .ok_or_else(|| not_found(RemoteOperation::Get, file_id))
    }

    async fn insert(
        &self,
        metadata: FileMetadata,
        content: Option<Content>,
    ) -> DriveResult<RemoteFile> {
        let mut state = self.state.lock();
        self.begin(&mut state, RemoteOperation::Insert)?;

        let id = FileId::from_string(Uuid::new_v4().simple().to_string());
        let now = Utc::now();
        let mut file = RemoteFile::new(id.clone(), "");
        file.created_date = Some(now);
        file.modified_date = Some(now);
        file.labels = Some(FileLabels::default());
        file.icon_link = Some(format!("memory://icons/{}", id));
        Self::apply_metadata(&mut file, metadata);

        if let Some(content) = content {
            file.original_filename = Some(file.title.clone());
            file.web_content_link = Some(format!("memory://files/{}/content", id));
            state.contents.insert(
                id,
                StoredContent {
                    revisions: vec![content.bytes],
                },
            );
        }

        state.files.push(file.clone());
        Ok(file)
    }

    async fn update(
        &self,
        file_id: &FileId,
        metadata: FileMetadata,
        content: Option<Content>,
        new_revision: bool,
    ) -> DriveResult<RemoteFile> {
        let mut state = self.state.lock();
        self.begin(&mut state, RemoteOperation::Update)?;

        let file = state
            .files
            .iter_mut()
            .find(|f| &f.id == file_id)
            .ok_or_else(|| not_found(RemoteOperation::Update, file_id))?;
        Self::apply_metadata(file, metadata);
        file.modified_date = Some(Utc::now());
        if content.is_some() {
            file.original_filename = Some(file.title.clone());
        }
        let updated = file.clone();

        if let Some(content) = content {
            let stored = state.contents.entry(file_id.clone()).or_default();
            if new_revision || stored.revisions.is_empty() {
                stored.revisions.push(content.bytes);
            } else if let Some(head) = stored.revisions.last_mut() {
                *head = content.bytes;
            }
        }

        Ok(updated)
    }

    async fn delete(&self, file_id: &FileId) -> DriveResult<()> {
        let mut state = self.state.lock();
        self.begin(&mut state, RemoteOperation::Delete)?;

        let before = state.files.len();
        state.files.retain(|f| &f.id != file_id);
        if state.files.len() == before {
            return Err(not_found(RemoteOperation::Delete, file_id));
        }
        state.contents.remove(file_id);
        Ok(())
    }

    async fn trash(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        let mut state = self.state.lock();
        self.begin(&mut state, RemoteOperation::Trash)?;

        let file = state
            .files
            .iter_mut()
            .find(|f| &f.id == file_id)
            .ok_or_else(|| not_found(RemoteOperation::Trash, file_id))?;
        file.labels = Some(FileLabels { trashed: true });
        file.modified_date = Some(Utc::now());
        Ok(file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize) -> MemoryDriveStore {
        let store = MemoryDriveStore::new().with_page_size(2);
        for i in 0..count {
            store.seed(RemoteFile::new(FileId::from_string(format!("f-{}", i)), "a.txt"));
        }
        store
    }

    #[tokio::test]
    async fn page_token_past_the_end_gives_empty_page() {
        let store = seeded(3);

        let page = store
            .list(&FileQuery::all(), Some(usize::MAX.to_string().as_str()))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.next_token(), None);
    }

    #[tokio::test]
    async fn malformed_page_token_is_remote_error() {
        let store = seeded(1);

        let err = store.list(&FileQuery::all(), Some("abc")).await.unwrap_err();

        assert_eq!(err.operation(), Some(RemoteOperation::List));
    }

    #[tokio::test]
    async fn pages_follow_offset_tokens() {
        let store = seeded(3);

        let first = store.list(&FileQuery::all(), None).await.unwrap();
        let second = store
            .list(&FileQuery::all(), first.next_token())
            .await
            .unwrap();

        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_token(), Some("2"));
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.next_token(), None);
    }
}
