//! Mirror orchestrator.
//!
//! Runs the push pass followed by the prune pass. Both passes are
//! sequential: one object or one directory at a time. Any collaborator
//! failure aborts the run with no rollback.

use crate::error::{MirrorError, MirrorResult};
use crate::path::{directory_prefixes, join_path, validate_object_name};
use crate::source::ObjectSource;
use crate::target::{DirectoryCreation, ShareTarget, UploadOptions};
use crate::types::{EntryKind, LiveNameSet, MirrorReport, ShareEntry};
use std::sync::Arc;
use tracing::{debug, info};

/// Default `Cache-Control` header written on every uploaded file.
pub const DEFAULT_CACHE_CONTROL: &str = "no-transform";

/// Tunables for the engine.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub cache_control: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache_control: Some(DEFAULT_CACHE_CONTROL.to_string()),
        }
    }
}

/// Result of a completed push pass.
#[derive(Debug)]
pub struct PushOutcome {
    /// Snapshot handed to the prune pass.
    pub live: LiveNameSet,
    pub report: MirrorReport,
}

/// Mirrors an [`ObjectSource`] into a [`ShareTarget`].
pub struct MirrorEngine {
    source: Arc<dyn ObjectSource>,
    share: Arc<dyn ShareTarget>,
    options: EngineOptions,
}

impl MirrorEngine {
    pub fn new(
        source: Arc<dyn ObjectSource>,
        share: Arc<dyn ShareTarget>,
        options: EngineOptions,
    ) -> Self {
        Self {
            source,
            share,
            options,
        }
    }

    /// Runs a full mirror: push every object, then prune stale files.
    ///
    /// The prune pass only starts once every object has been pushed.
    pub async fn run(&self) -> MirrorResult<MirrorReport> {
        let PushOutcome { live, mut report } = self.push().await?;
        let pruned = self.prune(&live).await?;
        report.merge(&pruned);

        info!(
            objects = report.objects_pushed,
            bytes = report.bytes_uploaded,
            directories_created = report.directories_created,
            files_deleted = report.files_deleted,
            "mirror run complete"
        );
        Ok(report)
    }

    /// Copies every object in the source into the share.
    pub async fn push(&self) -> MirrorResult<PushOutcome> {
        info!("listing objects in source container");
        let names = self
            .source
            .list_object_names()
            .await
            .map_err(MirrorError::ListObjects)?;

        let mut live = LiveNameSet::default();
        let mut report = MirrorReport::default();

        for name in names {
            validate_object_name(&name)?;
            live.insert(name.clone());
            self.push_object(&name, &mut report).await?;
        }

        info!(objects = live.len(), "push pass complete");
        Ok(PushOutcome { live, report })
    }

    async fn push_object(&self, name: &str, report: &mut MirrorReport) -> MirrorResult<()> {
        info!("  - {name}");

        let data = self
            .source
            .fetch_object(name)
            .await
            .map_err(|source| MirrorError::Fetch {
                name: name.to_string(),
                source,
            })?;
        let size = data.len() as u64;

        for dir in directory_prefixes(name) {
            if self.ensure_directory(dir).await? {
                report.directories_created += 1;
            }
        }

        let path = name.to_string();
        let options = UploadOptions {
            cache_control: self.options.cache_control.clone(),
            progress: Some(Arc::new(move |transferred: u64, total: u64| {
                info!("    uploaded {transferred} of {total} bytes of {path}");
            })),
        };

        self.share
            .upload_file(name, data, &options)
            .await
            .map_err(|source| MirrorError::Upload {
                path: name.to_string(),
                source,
            })?;

        report.objects_pushed += 1;
        report.bytes_uploaded += size;
        Ok(())
    }

    /// Makes sure a single directory level exists. Returns `true` if this
    /// call created it.
    async fn ensure_directory(&self, path: &str) -> MirrorResult<bool> {
        debug!("    checking directory '{path}' exists");
        let exists = self
            .share
            .directory_exists(path)
            .await
            .map_err(|source| MirrorError::DirectoryExists {
                path: path.to_string(),
                source,
            })?;
        if exists {
            return Ok(false);
        }

        info!("    creating directory '{path}'");
        let created = self
            .share
            .create_directory(path)
            .await
            .map_err(|source| MirrorError::CreateDirectory {
                path: path.to_string(),
                source,
            })?;

        if created == DirectoryCreation::AlreadyExists {
            debug!("    directory '{path}' appeared concurrently");
        }
        Ok(created == DirectoryCreation::Created)
    }

    /// Deletes every share file whose path is not in `live`.
    ///
    /// Walks the share depth-first from the root. Directories are visited
    /// but never deleted.
    pub async fn prune(&self, live: &LiveNameSet) -> MirrorResult<MirrorReport> {
        info!("checking share files correspond to objects");
        let mut report = MirrorReport::default();
        let mut pending = vec![String::new()];

        while let Some(dir) = pending.pop() {
            info!(" - folder /{dir}");
            report.directories_visited += 1;

            let children = self.list_children(&dir).await?;
            let mut subdirs = Vec::new();

            for entry in children {
                match entry.kind {
                    EntryKind::File if live.contains(&entry.path) => {
                        debug!("   - file /{} good", entry.path);
                        report.files_kept += 1;
                    }
                    EntryKind::File => {
                        self.share
                            .delete_file(&entry.path)
                            .await
                            .map_err(|source| MirrorError::Delete {
                                path: entry.path.clone(),
                                source,
                            })?;
                        info!("   - file /{} deleted", entry.path);
                        report.files_deleted += 1;
                    }
                    EntryKind::Directory => subdirs.push(entry.path),
                }
            }

            // Reversed so the stack pops sub-directories in listing order.
            pending.extend(subdirs.into_iter().rev());
        }

        info!(
            kept = report.files_kept,
            deleted = report.files_deleted,
            "prune pass complete"
        );
        Ok(report)
    }

    /// Lists every immediate child of `dir`, following listing markers
    /// until the share reports no more segments.
    async fn list_children(&self, dir: &str) -> MirrorResult<Vec<ShareEntry>> {
        let mut entries = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self
                .share
                .list_directory_page(dir, marker.as_deref())
                .await
                .map_err(|source| MirrorError::ListDirectory {
                    path: dir.to_string(),
                    source,
                })?;

            entries.extend(page.files.iter().map(|name| ShareEntry {
                path: join_path(dir, name),
                kind: EntryKind::File,
            }));
            entries.extend(page.directories.iter().map(|name| ShareEntry {
                path: join_path(dir, name),
                kind: EntryKind::Directory,
            }));

            match page.next_marker {
                Some(next) if !next.is_empty() => marker = Some(next),
                _ => break,
            }
        }

        Ok(entries)
    }
}
