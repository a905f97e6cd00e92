//! File share contract driven by both passes.

use crate::error::BoxError;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Upload progress callback: `(bytes_transferred, total_bytes)`.
pub type ProgressFn = dyn Fn(u64, u64) + Send + Sync;

/// Outcome of a successful directory creation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectoryCreation {
    Created,
    AlreadyExists,
}

/// One segment of a directory listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Names (not paths) of files directly inside the directory.
    pub files: Vec<String>,
    /// Names (not paths) of sub-directories directly inside the directory.
    pub directories: Vec<String>,
    /// Marker for the next segment; `None` once the listing is complete.
    pub next_marker: Option<String>,
}

/// Per-upload options.
#[derive(Clone, Default)]
pub struct UploadOptions {
    /// Value for the file's `Cache-Control` content header.
    pub cache_control: Option<String>,
    pub progress: Option<Arc<ProgressFn>>,
}

impl UploadOptions {
    /// Reports progress to the callback, if any.
    pub fn report_progress(&self, transferred: u64, total: u64) {
        if let Some(progress) = &self.progress {
            progress(transferred, total);
        }
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("cache_control", &self.cache_control)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Write access to the destination share.
///
/// Paths are relative to the share root, `/`-separated, without a leading
/// separator. The root directory is the empty path.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    async fn directory_exists(&self, path: &str) -> Result<bool, BoxError>;

    /// Creates a single directory level. The parent must already exist.
    async fn create_directory(&self, path: &str) -> Result<DirectoryCreation, BoxError>;

    /// Lists one segment of a directory's immediate children, starting at
    /// `marker` (`None` for the first segment).
    async fn list_directory_page(
        &self,
        path: &str,
        marker: Option<&str>,
    ) -> Result<ListingPage, BoxError>;

    async fn delete_file(&self, path: &str) -> Result<(), BoxError>;

    /// Writes `data` as the full content of the file at `path`, replacing
    /// any existing file.
    async fn upload_file(
        &self,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> Result<(), BoxError>;
}
