//! Shared types for mirror runs.

use std::collections::BTreeSet;
use std::collections::btree_set;

/// Names of every object observed during the current run's enumeration.
///
/// Built only by the push pass; the prune pass receives it by reference and
/// cannot add to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveNameSet {
    names: BTreeSet<String>,
}

impl LiveNameSet {
    pub(crate) fn insert(&mut self, name: String) -> bool {
        self.names.insert(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.names.iter()
    }
}

impl FromIterator<String> for LiveNameSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LiveNameSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Kind of an entry found while walking the share.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// An entry discovered by the prune pass, addressed by its full share path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareEntry {
    pub path: String,
    pub kind: EntryKind,
}

/// Counters collected over a mirror run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub objects_pushed: usize,
    pub bytes_uploaded: u64,
    pub directories_created: usize,
    pub directories_visited: usize,
    pub files_kept: usize,
    pub files_deleted: usize,
}

impl MirrorReport {
    /// Adds the counters of `other` to this report.
    pub fn merge(&mut self, other: &MirrorReport) {
        self.objects_pushed += other.objects_pushed;
        self.bytes_uploaded += other.bytes_uploaded;
        self.directories_created += other.directories_created;
        self.directories_visited += other.directories_visited;
        self.files_kept += other.files_kept;
        self.files_deleted += other.files_deleted;
    }
}
