//! Shared helpers for Azure transport tests.

#![allow(dead_code)]

use blobshare_azure::{ContainerListClient, FileShareClient, MirrorConfig};
use std::collections::HashMap;

/// Base64 of `test-account-key`.
pub const TEST_KEY: &str = "dGVzdC1hY2NvdW50LWtleQ==";

/// Variable map with every required value set.
pub fn required_vars() -> HashMap<&'static str, String> {
    HashMap::from([
        ("ACCOUNT_NAME", "devstore".to_string()),
        ("ACCOUNT_KEY", TEST_KEY.to_string()),
        ("CONTAINER_NAME", "source".to_string()),
        ("SHARE_NAME", "mirror".to_string()),
    ])
}

pub fn config_from(vars: &HashMap<&'static str, String>) -> blobshare_azure::AzureResult<MirrorConfig> {
    MirrorConfig::from_lookup(|name| vars.get(name).cloned())
}

/// Config whose blob and file endpoints point at a mock server.
pub fn mock_config(endpoint: &str) -> MirrorConfig {
    let mut vars = required_vars();
    vars.insert("BLOB_ENDPOINT", endpoint.to_string());
    vars.insert("FILE_ENDPOINT", endpoint.to_string());
    config_from(&vars).expect("test config must load")
}

/// Client against a mock server, uploading in ranges of `range_bytes`.
pub fn mock_client(endpoint: &str, range_bytes: usize) -> FileShareClient {
    let mut config = mock_config(endpoint);
    config.upload_range_bytes = range_bytes;
    FileShareClient::new(&config).expect("client must build")
}

/// Container listing client against a mock server.
pub fn mock_container_client(endpoint: &str) -> ContainerListClient {
    ContainerListClient::new(&mock_config(endpoint)).expect("client must build")
}

/// List Blobs body with one `Blob` entry per name.
pub fn blob_listing_xml(names: &[&str], next_marker: Option<&str>) -> String {
    let blobs: String = names
        .iter()
        .map(|name| {
            format!(
                "<Blob><Name>{name}</Name><Properties><Content-Length>1</Content-Length></Properties></Blob>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ServiceEndpoint="http://localhost/" ContainerName="source"><Blobs>{blobs}</Blobs><NextMarker>{}</NextMarker></EnumerationResults>"#,
        next_marker.unwrap_or_default()
    )
}

/// Listing body in the Azure Files `EnumerationResults` shape.
pub fn listing_xml(files: &[&str], directories: &[&str], next_marker: Option<&str>) -> String {
    let mut entries = String::new();
    for name in directories {
        entries.push_str(&format!(
            "<Directory><FileId>1</FileId><Name>{name}</Name><Properties /></Directory>"
        ));
    }
    for name in files {
        entries.push_str(&format!(
            "<File><FileId>2</FileId><Name>{name}</Name><Properties><Content-Length>3</Content-Length></Properties></File>"
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ServiceEndpoint="http://localhost/" ShareName="mirror" DirectoryPath=""><Marker /><Entries>{entries}</Entries><NextMarker>{}</NextMarker></EnumerationResults>"#,
        next_marker.unwrap_or_default()
    )
}
