//! Mirror engine error types.

use thiserror::Error;

/// Opaque error returned by a transport behind [`crate::ObjectSource`] or
/// [`crate::ShareTarget`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors that abort a mirror run.
///
/// Every variant is fatal: the engine stops at the first failure and leaves
/// the share in whatever state it reached.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid object name {name:?}: {reason}")]
    InvalidObjectName { name: String, reason: &'static str },

    #[error("failed to list objects in source container")]
    ListObjects(#[source] BoxError),

    #[error("failed to fetch object {name}")]
    Fetch {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to check directory {path}")]
    DirectoryExists {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to create directory {path}")]
    CreateDirectory {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to upload file {path}")]
    Upload {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to list share directory /{path}")]
    ListDirectory {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to delete file {path}")]
    Delete {
        path: String,
        #[source]
        source: BoxError,
    },
}
