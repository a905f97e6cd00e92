//! Listing response bodies: Azure Files "List Directories and Files" and
//! Azure Blob "List Blobs".

use crate::error::AzureResult;
use blobshare_mirror::ListingPage;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnumerationResults {
    #[serde(default)]
    entries: Entries,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Entries {
    #[serde(rename = "$value", default)]
    items: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
enum Entry {
    File(NamedEntry),
    Directory(NamedEntry),
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    #[serde(rename = "Name")]
    name: String,
}

/// Parses one listing segment. An empty `NextMarker` ends the listing.
pub fn parse_listing(xml: &str) -> AzureResult<ListingPage> {
    let results: EnumerationResults = quick_xml::de::from_str(xml)?;

    let mut page = ListingPage {
        next_marker: results.next_marker.filter(|m| !m.trim().is_empty()),
        ..ListingPage::default()
    };
    for entry in results.entries.items {
        match entry {
            Entry::File(file) => page.files.push(file.name),
            Entry::Directory(dir) => page.directories.push(dir.name),
        }
    }
    Ok(page)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlobEnumerationResults {
    #[serde(default)]
    blobs: Blobs,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Blobs {
    #[serde(rename = "Blob", default)]
    items: Vec<NamedEntry>,
}

/// One segment of a container listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlobPage {
    /// Blob names exactly as stored, without any normalization.
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

/// Parses one List Blobs segment. An empty `NextMarker` ends the listing.
pub fn parse_blob_listing(xml: &str) -> AzureResult<BlobPage> {
    let results: BlobEnumerationResults = quick_xml::de::from_str(xml)?;
    Ok(BlobPage {
        names: results.blobs.items.into_iter().map(|b| b.name).collect(),
        next_marker: results.next_marker.filter(|m| !m.trim().is_empty()),
    })
}
