//! REST client for an Azure Files share.
//!
//! Speaks the Azure Files REST API directly with SharedKey-signed requests.
//! Files are written in two steps: Create File reserves the full length,
//! then Put Range writes the content in fixed-size ranges, several at once.

use crate::config::MirrorConfig;
use crate::error::{AzureError, AzureResult};
use crate::listing::parse_listing;
use crate::rest::{SignedClient, endpoint_with_segment, error_code, status_error};
use async_trait::async_trait;
use blobshare_mirror::{BoxError, DirectoryCreation, ListingPage, ShareTarget, UploadOptions};
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const ALREADY_EXISTS: &str = "ResourceAlreadyExists";

/// Client for one file share.
pub struct FileShareClient {
    http: SignedClient,
    share_url: Url,
    range_bytes: usize,
    parallelism: usize,
}

impl FileShareClient {
    pub fn new(config: &MirrorConfig) -> AzureResult<Self> {
        Ok(Self {
            http: SignedClient::new(config)?,
            share_url: endpoint_with_segment(&config.file_endpoint(), &config.share_name)?,
            range_bytes: config.upload_range_bytes.max(1),
            parallelism: config.upload_parallelism.max(1),
        })
    }

    /// URL of a file or directory, `path` relative to the share root.
    pub fn resource_url(&self, path: &str) -> Url {
        let mut url = self.share_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    fn directory_url(&self, path: &str) -> Url {
        let mut url = self.resource_url(path);
        url.query_pairs_mut().append_pair("restype", "directory");
        url
    }

    // ── Directories ──

    pub async fn directory_exists(&self, path: &str) -> AzureResult<bool> {
        let resp = self
            .http
            .send(Method::HEAD, self.directory_url(path), HeaderMap::new(), None)
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error("get directory properties", path, &resp)),
        }
    }

    /// Creates one directory level. An existing directory is reported as
    /// [`DirectoryCreation::AlreadyExists`].
    pub async fn create_directory(&self, path: &str) -> AzureResult<DirectoryCreation> {
        let mut headers = smb_headers("Directory");
        headers.insert("x-ms-file-permission", HeaderValue::from_static("inherit"));

        let resp = self
            .http
            .send(Method::PUT, self.directory_url(path), headers, Some(Bytes::new()))
            .await?;

        match resp.status() {
            StatusCode::CREATED => Ok(DirectoryCreation::Created),
            StatusCode::CONFLICT if error_code(&resp).as_deref() == Some(ALREADY_EXISTS) => {
                Ok(DirectoryCreation::AlreadyExists)
            }
            _ => Err(status_error("create directory", path, &resp)),
        }
    }

    /// Lists one segment of a directory's children.
    pub async fn list_directory_page(
        &self,
        path: &str,
        marker: Option<&str>,
    ) -> AzureResult<ListingPage> {
        let mut url = self.directory_url(path);
        url.query_pairs_mut().append_pair("comp", "list");
        if let Some(marker) = marker {
            url.query_pairs_mut().append_pair("marker", marker);
        }

        let resp = self.http.send(Method::GET, url, HeaderMap::new(), None).await?;
        if resp.status() != StatusCode::OK {
            return Err(status_error("list directory", path, &resp));
        }

        let page = parse_listing(&resp.text().await?)?;
        debug!(
            "listed /{path}: {} files, {} directories, more: {}",
            page.files.len(),
            page.directories.len(),
            page.next_marker.is_some()
        );
        Ok(page)
    }

    // ── Files ──

    pub async fn delete_file(&self, path: &str) -> AzureResult<()> {
        let resp = self
            .http
            .send(Method::DELETE, self.resource_url(path), HeaderMap::new(), None)
            .await?;

        if resp.status() != StatusCode::ACCEPTED {
            return Err(status_error("delete file", path, &resp));
        }
        Ok(())
    }

    /// Creates or replaces the file at `path` with `data`.
    ///
    /// Ranges are written with bounded parallelism; progress is reported
    /// after each completed range.
    pub async fn upload_file(
        &self,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> AzureResult<()> {
        let total = data.len() as u64;
        self.create_file(path, total, options.cache_control.as_deref())
            .await?;
        if total == 0 {
            debug!("created empty file /{path}");
            return Ok(());
        }

        let mut range_url = self.resource_url(path);
        range_url.query_pairs_mut().append_pair("comp", "range");
        let range_url = &range_url;
        let transferred = &AtomicU64::new(0);

        let ranges = (0..data.len()).step_by(self.range_bytes).map(|start| {
            let end = (start + self.range_bytes).min(data.len());
            (start, data.slice(start..end))
        });

        futures::stream::iter(ranges)
            .map(move |(start, chunk)| async move {
                let len = chunk.len() as u64;
                self.put_range(path, range_url.clone(), start, chunk).await?;
                let done = transferred.fetch_add(len, Ordering::SeqCst) + len;
                options.report_progress(done, total);
                Ok::<_, AzureError>(())
            })
            .buffer_unordered(self.parallelism)
            .try_collect::<Vec<()>>()
            .await?;

        Ok(())
    }

    async fn create_file(
        &self,
        path: &str,
        length: u64,
        cache_control: Option<&str>,
    ) -> AzureResult<()> {
        let mut headers = smb_headers("None");
        headers.insert("x-ms-type", HeaderValue::from_static("file"));
        headers.insert("x-ms-content-length", HeaderValue::from(length));
        headers.insert("x-ms-file-permission", HeaderValue::from_static("inherit"));
        if let Some(cache_control) = cache_control {
            headers.insert("x-ms-cache-control", HeaderValue::from_str(cache_control)?);
        }

        let resp = self
            .http
            .send(Method::PUT, self.resource_url(path), headers, Some(Bytes::new()))
            .await?;

        if resp.status() != StatusCode::CREATED {
            return Err(status_error("create file", path, &resp));
        }
        Ok(())
    }

    async fn put_range(
        &self,
        path: &str,
        url: Url,
        start: usize,
        chunk: Bytes,
    ) -> AzureResult<()> {
        let end = start + chunk.len() - 1;
        let range = format!("bytes={start}-{end}");
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-range", HeaderValue::from_str(&range)?);
        headers.insert("x-ms-write", HeaderValue::from_static("update"));

        let resp = self.http.send(Method::PUT, url, headers, Some(chunk)).await?;
        if resp.status() != StatusCode::CREATED {
            return Err(status_error("put range", path, &resp));
        }
        Ok(())
    }
}

/// SMB property headers shared by directory and file creation.
fn smb_headers(attributes: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-ms-file-attributes", HeaderValue::from_static(attributes));
    headers.insert("x-ms-file-creation-time", HeaderValue::from_static("now"));
    headers.insert("x-ms-file-last-write-time", HeaderValue::from_static("now"));
    headers
}

#[async_trait]
impl ShareTarget for FileShareClient {
    async fn directory_exists(&self, path: &str) -> Result<bool, BoxError> {
        Ok(FileShareClient::directory_exists(self, path).await?)
    }

    async fn create_directory(&self, path: &str) -> Result<DirectoryCreation, BoxError> {
        Ok(FileShareClient::create_directory(self, path).await?)
    }

    async fn list_directory_page(
        &self,
        path: &str,
        marker: Option<&str>,
    ) -> Result<ListingPage, BoxError> {
        Ok(FileShareClient::list_directory_page(self, path, marker).await?)
    }

    async fn delete_file(&self, path: &str) -> Result<(), BoxError> {
        Ok(FileShareClient::delete_file(self, path).await?)
    }

    async fn upload_file(
        &self,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> Result<(), BoxError> {
        Ok(FileShareClient::upload_file(self, path, data, options).await?)
    }
}
