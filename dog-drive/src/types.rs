use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type the remote service uses to mark a record as a folder
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Identifier the remote service accepts for the top of the user's drive
pub const ROOT_FOLDER_ID: &str = "root";

/// Remote-assigned identifier of a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote-assigned identifier of a folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub String);

impl FolderId {
    /// The storage root
    pub fn root() -> Self {
        Self(ROOT_FOLDER_ID.to_string())
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_FOLDER_ID
    }
}

impl From<&str> for FolderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<FileId> for FolderId {
    fn from(id: FileId) -> Self {
        Self(id.0)
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference from a file to one of its parent folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    pub id: FolderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_root: Option<bool>,
}

impl ParentReference {
    pub fn new(id: FolderId) -> Self {
        Self { id, is_root: None }
    }

    pub fn root() -> Self {
        Self {
            id: FolderId::root(),
            is_root: Some(true),
        }
    }
}

/// Status flags the remote service keeps per file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLabels {
    #[serde(default)]
    pub trashed: bool,
}

/// Image dimensions reported for image content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMediaMetadata {
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
}

/// A file record as the remote service returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: FileId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub thumbnail_link: Option<String>,
    #[serde(default)]
    pub icon_link: Option<String>,
    #[serde(default)]
    pub web_content_link: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parents: Vec<ParentReference>,
    #[serde(default)]
    pub labels: Option<FileLabels>,
    #[serde(default)]
    pub image_media_metadata: Option<ImageMediaMetadata>,
}

impl RemoteFile {
    /// Minimal record with only an id and a title
    pub fn new<S: Into<String>>(id: FileId, title: S) -> Self {
        Self {
            id,
            title: title.into(),
            mime_type: None,
            description: None,
            original_filename: None,
            thumbnail_link: None,
            icon_link: None,
            web_content_link: None,
            created_date: None,
            modified_date: None,
            parents: Vec::new(),
            labels: None,
            image_media_metadata: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }

    pub fn is_trashed(&self) -> bool {
        self.labels.as_ref().map_or(false, |l| l.trashed)
    }

    /// Whether `folder` is one of this record's parents
    pub fn has_parent(&self, folder: &FolderId) -> bool {
        self.parents.iter().any(|p| &p.id == folder)
    }
}

/// A remote folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    pub id: FolderId,
    pub title: String,
    pub parent: ParentReference,
}

impl From<RemoteFile> for RemoteFolder {
    fn from(file: RemoteFile) -> Self {
        let parent = file
            .parents
            .into_iter()
            .next()
            .unwrap_or_else(ParentReference::root);
        Self {
            id: FolderId::from(file.id),
            title: file.title,
            parent,
        }
    }
}

/// Metadata sent with an insert or update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ParentReference>,
}

impl FileMetadata {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Metadata for a new folder directly under the storage root
    pub fn folder<T: Into<String>, D: Into<String>>(title: T, description: D) -> Self {
        Self::new(title)
            .with_description(description)
            .with_mime_type(FOLDER_MIME_TYPE)
            .with_parent(FolderId::root())
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_parent(mut self, folder: FolderId) -> Self {
        self.parents.push(ParentReference::new(folder));
        self
    }

    pub fn with_parents(mut self, parents: Vec<ParentReference>) -> Self {
        self.parents = parents;
        self
    }
}

/// Content attached to an insert or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl Content {
    pub fn new<B: Into<Bytes>, S: Into<String>>(bytes: B, mime_type: S) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Typed listing filter. `None` fields do not constrain the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub title: Option<String>,
    pub mime_type: Option<String>,
    pub trashed: Option<bool>,
    pub parent: Option<FolderId>,
}

impl FileQuery {
    /// Every record visible to the session
    pub fn all() -> Self {
        Self::default()
    }

    /// Folders whose title equals `title`
    pub fn folders_titled<S: Into<String>>(title: S) -> Self {
        Self {
            title: Some(title.into()),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            ..Default::default()
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_trashed(mut self, trashed: bool) -> Self {
        self.trashed = Some(trashed);
        self
    }

    pub fn in_folder(mut self, folder: FolderId) -> Self {
        self.parent = Some(folder);
        self
    }

    /// Whether a record satisfies every set constraint
    pub fn matches(&self, file: &RemoteFile) -> bool {
        if let Some(title) = &self.title {
            if &file.title != title {
                return false;
            }
        }
        if let Some(mime_type) = &self.mime_type {
            if file.mime_type.as_ref() != Some(mime_type) {
                return false;
            }
        }
        if let Some(trashed) = self.trashed {
            if file.is_trashed() != trashed {
                return false;
            }
        }
        if let Some(parent) = &self.parent {
            if !file.has_parent(parent) {
                return false;
            }
        }
        true
    }

    /// Render as a Drive query string (`q` parameter). Empty when unconstrained.
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(title) = &self.title {
            clauses.push(format!("title = '{}'", escape_literal(title)));
        }
        if let Some(mime_type) = &self.mime_type {
            clauses.push(format!("mimeType = '{}'", escape_literal(mime_type)));
        }
        if let Some(trashed) = self.trashed {
            clauses.push(format!("trashed = {}", trashed));
        }
        if let Some(parent) = &self.parent {
            clauses.push(format!("'{}' in parents", escape_literal(parent.as_str())));
        }
        clauses.join(" and ")
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    #[serde(default)]
    pub items: Vec<RemoteFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl FilePage {
    pub fn new(items: Vec<RemoteFile>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }

    /// Token for the next page. An empty token ends the listing.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}
