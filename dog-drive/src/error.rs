use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for drive operations
pub type DriveResult<T> = Result<T, DriveError>;

/// Remote call that produced a [`DriveError::RemoteOperationFailed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    List,
    Get,
    Insert,
    Update,
    Delete,
    Trash,
}

impl RemoteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Trash => "trash",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during drive operations
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Local file does not exist: {}", .path.display())]
    LocalFileMissing { path: PathBuf },

    /// Authentication, quota, network and not-found failures all land here.
    #[error("Remote {operation} failed: {message}")]
    RemoteOperationFailed {
        operation: RemoteOperation,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Could not resolve folder '{title}': {reason}")]
    FolderResolutionFailed { title: String, reason: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl DriveError {
    /// Create a remote error wrapping the transport's error
    pub fn remote<E>(operation: RemoteOperation, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RemoteOperationFailed {
            operation,
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Create a remote error from a message only (e.g. an HTTP status body)
    pub fn remote_message<S: Into<String>>(operation: RemoteOperation, message: S) -> Self {
        Self::RemoteOperationFailed {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Create a local file missing error
    pub fn local_missing<P: Into<PathBuf>>(path: P) -> Self {
        Self::LocalFileMissing { path: path.into() }
    }

    /// Create a folder resolution error
    pub fn folder_resolution<T: Into<String>, R: Into<String>>(title: T, reason: R) -> Self {
        Self::FolderResolutionFailed {
            title: title.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Attribute this error to a remote call.
    ///
    /// Store implementations may surface I/O or serialization errors; past the
    /// coordinator boundary every store failure reads as a failed remote call.
    pub fn into_remote(self, operation: RemoteOperation) -> Self {
        match self {
            Self::RemoteOperationFailed { .. } => self,
            other => Self::RemoteOperationFailed {
                operation,
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    pub fn is_local_missing(&self) -> bool {
        matches!(self, Self::LocalFileMissing { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteOperationFailed { .. })
    }

    pub fn is_folder_resolution(&self) -> bool {
        matches!(self, Self::FolderResolutionFailed { .. })
    }

    /// The remote call that failed, if this is a remote error
    pub fn operation(&self) -> Option<RemoteOperation> {
        match self {
            Self::RemoteOperationFailed { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
