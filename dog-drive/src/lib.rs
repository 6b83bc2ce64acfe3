//! # dog-drive: Folder-scoped cloud drive sync
//!
//! `dog-drive` backs local files up into one named folder of a remote drive.
//! A session resolves (or creates) that folder once, in the background, and then
//! inserts new remote files or updates existing ones on explicit request.
//!
//! ## Key Features
//!
//! - **One folder per session**: found by exact title, created under the storage root when missing
//! - **Non-blocking start**: uploads never wait for folder resolution unless asked to
//! - **Explicit intent**: every call is an insert or an update chosen by the caller, no diffing
//! - **Typed failures**: missing local files, failed remote calls and failed folder resolution are distinct errors
//! - **Storage agnostic**: any backend implementing [`DriveStore`] (in-memory, Drive v2 REST, custom)
//!
//! ## Quick Start
//!
//! ```rust
//! use dog_drive::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> DriveResult<()> {
//! let store = MemoryDriveStore::new();
//! let config = DriveConfig::new(
//!     "store-7",
//!     "owner@example.com",
//!     "uploader@example.iam.gserviceaccount.com",
//!     "/etc/keys/uploader.p12",
//!     "Store Backups",
//! );
//!
//! // 1. Start the session; folder resolution runs in the background
//! let session = DriveSession::new(store, config)?;
//!
//! // 2. Wait for the folder when placement matters
//! let folder = session.wait_for_folder().await?;
//!
//! // 3. Upload
//! let dir = std::env::temp_dir().join("dog-drive-doc");
//! std::fs::create_dir_all(&dir)?;
//! let path = dir.join("orders.csv");
//! std::fs::write(&path, b"id,total\n1,9.50\n")?;
//!
//! let file = session.insert(&path, UploadOptions::new()).await?;
//! assert_eq!(file.title, "orders.csv");
//!
//! // 4. Update the same remote file later, overwriting the head revision
//! session
//!     .update(&file.id, &path, UploadOptions::new().overwrite_revision())
//!     .await?;
//! # let _ = folder;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │   Your Service    │  ← Business logic only
//! ├───────────────────┤
//! │   DriveSession    │  ← Target folder + upload coordination
//! ├───────────────────┤
//! │   DriveStore      │  ← Remote primitives (list/get/insert/update/delete/trash)
//! └───────────────────┘
//! ```

mod config;
mod content_type;
mod coordinator;
mod descriptor;
mod error;
mod folder;
#[cfg(feature = "drive-v2")]
mod http_store;
mod memory_store;
mod session;
pub mod store;
mod types;
mod upload;

// Re-export main types for clean API
pub use config::{
    DriveConfig, ServiceAccount, DEFAULT_FOLDER_DESCRIPTION, DEFAULT_INSERT_DESCRIPTION,
    DEFAULT_UPDATE_DESCRIPTION, ENV_PREFIX,
};
pub use content_type::{
    extension_key, ContentTypeRegistry, ContentTypes, MimeGuessRegistry, StaticRegistry,
    UNKNOWN_CONTENT_TYPE,
};
pub use coordinator::DefaultUploadCoordinator;
pub use descriptor::{FileDescriptor, FileListing};
pub use error::{DriveError, DriveResult, RemoteOperation};
pub use folder::{FolderResolver, FolderState, TargetFolder, TargetFolderSlot};
#[cfg(feature = "drive-v2")]
pub use http_store::{
    multipart_related_body, DriveV2Config, DriveV2Store, StaticTokenProvider, DRIVE_API_URL,
    DRIVE_UPLOAD_URL,
};
pub use memory_store::MemoryDriveStore;
pub use session::DriveSession;
pub use store::{CredentialProvider, DriveStore};
pub use types::{
    Content, FileId, FileLabels, FileMetadata, FilePage, FileQuery, FolderId, ImageMediaMetadata,
    ParentReference, RemoteFile, RemoteFolder, FOLDER_MIME_TYPE, ROOT_FOLDER_ID,
};
pub use upload::{UploadCoordinator, UploadIntent, UploadOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        DriveConfig, DriveError, DriveResult, DriveSession, DriveStore, FileDescriptor, FileId,
        FolderId, MemoryDriveStore, UploadOptions,
    };
}
