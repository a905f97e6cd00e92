//! In-memory source and share doubles shared by the engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use blobshare_mirror::{
    BoxError, DirectoryCreation, ListingPage, ObjectSource, ShareTarget, UploadOptions,
};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

// ── Source ──────────────────────────────────────────────────────

/// Object source backed by a map, with optional fetch failure injection.
#[derive(Default)]
pub struct MemorySource {
    objects: Vec<(String, Bytes)>,
    fail_fetch: Option<String>,
    fetched: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object. Listing order follows insertion order.
    pub fn with_object(mut self, name: &str, data: &[u8]) -> Self {
        self.objects
            .push((name.to_string(), Bytes::copy_from_slice(data)));
        self
    }

    pub fn failing_fetch(mut self, name: &str) -> Self {
        self.fail_fetch = Some(name.to_string());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectSource for MemorySource {
    async fn list_object_names(&self) -> Result<Vec<String>, BoxError> {
        Ok(self.objects.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn fetch_object(&self, name: &str) -> Result<Bytes, BoxError> {
        self.fetched.lock().unwrap().push(name.to_string());
        if self.fail_fetch.as_deref() == Some(name) {
            return Err(format!("injected fetch failure for {name}").into());
        }
        self.objects
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| format!("BlobNotFound: {name}").into())
    }
}

/// Source whose listing itself fails.
pub struct BrokenSource;

#[async_trait]
impl ObjectSource for BrokenSource {
    async fn list_object_names(&self) -> Result<Vec<String>, BoxError> {
        Err("container not found".into())
    }

    async fn fetch_object(&self, _name: &str) -> Result<Bytes, BoxError> {
        Err("unreachable".into())
    }
}

// ── Share ───────────────────────────────────────────────────────

/// Operations recorded by [`MemoryShare`], in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareCall {
    Exists(String),
    CreateDirectory(String),
    List { path: String, marker: Option<String> },
    Delete(String),
    Upload(String),
}

#[derive(Default)]
struct ShareState {
    directories: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    calls: Vec<ShareCall>,
    cache_controls: BTreeMap<String, Option<String>>,
}

/// File share double with Azure-like rules: a directory or file can only be
/// created inside an existing directory, and listings are paginated.
pub struct MemoryShare {
    state: Mutex<ShareState>,
    page_size: usize,
    fail_delete: Option<String>,
    fail_create: Option<String>,
    fail_list: Option<String>,
}

impl Default for MemoryShare {
    fn default() -> Self {
        Self {
            state: Mutex::new(ShareState::default()),
            page_size: 1000,
            fail_delete: None,
            fail_create: None,
            fail_list: None,
        }
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

fn leaf_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, leaf)| leaf)
}

impl ShareState {
    fn has_directory(&self, path: &str) -> bool {
        path.is_empty() || self.directories.contains(path)
    }
}

impl MemoryShare {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Seeds a directory and all of its ancestors.
    pub fn with_directory(self, path: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut current = String::new();
            for segment in path.split('/') {
                if !current.is_empty() {
                    current.push('/');
                }
                current.push_str(segment);
                state.directories.insert(current.clone());
            }
        }
        self
    }

    /// Seeds a file, creating its parent directories.
    pub fn with_file(self, path: &str, data: &[u8]) -> Self {
        let parent = parent_of(path).to_string();
        let share = if parent.is_empty() {
            self
        } else {
            self.with_directory(&parent)
        };
        share
            .state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), data.to_vec());
        share
    }

    pub fn failing_delete(mut self, path: &str) -> Self {
        self.fail_delete = Some(path.to_string());
        self
    }

    pub fn failing_create(mut self, path: &str) -> Self {
        self.fail_create = Some(path.to_string());
        self
    }

    pub fn failing_list(mut self, path: &str) -> Self {
        self.fail_list = Some(path.to_string());
        self
    }

    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn file_paths(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    pub fn directories(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().directories.clone()
    }

    pub fn calls(&self) -> Vec<ShareCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn cache_control(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .cache_controls
            .get(path)
            .cloned()
            .flatten()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait]
impl ShareTarget for MemoryShare {
    async fn directory_exists(&self, path: &str) -> Result<bool, BoxError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ShareCall::Exists(path.to_string()));
        Ok(state.directories.contains(path))
    }

    async fn create_directory(&self, path: &str) -> Result<DirectoryCreation, BoxError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ShareCall::CreateDirectory(path.to_string()));
        if self.fail_create.as_deref() == Some(path) {
            return Err(format!("AuthorizationPermissionMismatch: {path}").into());
        }
        if state.directories.contains(path) {
            return Ok(DirectoryCreation::AlreadyExists);
        }
        if !state.has_directory(parent_of(path)) {
            return Err(format!("ParentNotFound: {path}").into());
        }
        state.directories.insert(path.to_string());
        Ok(DirectoryCreation::Created)
    }

    async fn list_directory_page(
        &self,
        path: &str,
        marker: Option<&str>,
    ) -> Result<ListingPage, BoxError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ShareCall::List {
            path: path.to_string(),
            marker: marker.map(str::to_string),
        });
        if self.fail_list.as_deref() == Some(path) {
            return Err(format!("injected list failure for /{path}").into());
        }
        if !state.has_directory(path) {
            return Err(format!("ResourceNotFound: /{path}").into());
        }

        // Children sorted by name, files and directories interleaved.
        let mut children: Vec<(String, bool)> = state
            .directories
            .iter()
            .filter(|d| parent_of(d) == path)
            .map(|d| (leaf_of(d).to_string(), true))
            .chain(
                state
                    .files
                    .keys()
                    .filter(|f| parent_of(f) == path)
                    .map(|f| (leaf_of(f).to_string(), false)),
            )
            .collect();
        children.sort();

        let start: usize = match marker {
            Some(m) => m.parse()?,
            None => 0,
        };
        let end = (start + self.page_size).min(children.len());

        let mut page = ListingPage::default();
        for (name, is_dir) in &children[start.min(end)..end] {
            if *is_dir {
                page.directories.push(name.clone());
            } else {
                page.files.push(name.clone());
            }
        }
        if end < children.len() {
            page.next_marker = Some(end.to_string());
        }
        Ok(page)
    }

    async fn delete_file(&self, path: &str) -> Result<(), BoxError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ShareCall::Delete(path.to_string()));
        if self.fail_delete.as_deref() == Some(path) {
            return Err(format!("SharingViolation: {path}").into());
        }
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| format!("ResourceNotFound: {path}").into())
    }

    async fn upload_file(
        &self,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> Result<(), BoxError> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(ShareCall::Upload(path.to_string()));
            if !state.has_directory(parent_of(path)) {
                return Err(format!("ParentNotFound: {path}").into());
            }
            state.files.insert(path.to_string(), data.to_vec());
            state
                .cache_controls
                .insert(path.to_string(), options.cache_control.clone());
        }
        let total = data.len() as u64;
        options.report_progress(total, total);
        Ok(())
    }
}
