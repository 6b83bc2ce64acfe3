use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DriveError, FileId, RemoteFile};

/// Caller-facing view of a remote file.
///
/// Built only from records the remote service returned, so `id` is always a
/// remote-assigned identifier. Titles are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub id: FileId,
    pub title: String,
    pub original_filename: Option<String>,
    pub thumbnail_link: Option<String>,
    pub icon_link: Option<String>,
    pub web_content_link: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_date: Option<DateTime<Utc>>,
    pub height: Option<i32>,
    pub width: Option<i32>,
}

// Parents, MIME type, description and labels are dropped on purpose.
impl From<&RemoteFile> for FileDescriptor {
    fn from(file: &RemoteFile) -> Self {
        let image = file.image_media_metadata.as_ref();
        Self {
            id: file.id.clone(),
            title: file.title.clone(),
            original_filename: file.original_filename.clone(),
            thumbnail_link: file.thumbnail_link.clone(),
            icon_link: file.icon_link.clone(),
            web_content_link: file.web_content_link.clone(),
            created_date: file.created_date,
            modified_date: file.modified_date,
            height: image.and_then(|m| m.height),
            width: image.and_then(|m| m.width),
        }
    }
}

impl From<RemoteFile> for FileDescriptor {
    fn from(file: RemoteFile) -> Self {
        Self::from(&file)
    }
}

/// Result of paging through a listing.
///
/// A page failure stops the listing; the records gathered before it are kept
/// and the failure is recorded in `interrupted`.
#[derive(Debug)]
pub struct FileListing {
    pub files: Vec<FileDescriptor>,
    pub pages: usize,
    pub interrupted: Option<DriveError>,
}

impl FileListing {
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drop the interruption, keeping whatever was listed
    pub fn into_files(self) -> Vec<FileDescriptor> {
        self.files
    }
}
