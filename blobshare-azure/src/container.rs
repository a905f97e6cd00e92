//! Raw blob name listing over the Blob REST API.
//!
//! Names come back exactly as stored. `object_store` listings strip leading
//! and trailing `/` and fail outright on an empty segment.

use crate::config::MirrorConfig;
use crate::error::AzureResult;
use crate::listing::{BlobPage, parse_blob_listing};
use crate::rest::{SignedClient, endpoint_with_segment, status_error};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use tracing::debug;

/// Lists the blob names of one container.
pub struct ContainerListClient {
    http: SignedClient,
    container: String,
    container_url: Url,
}

impl ContainerListClient {
    pub fn new(config: &MirrorConfig) -> AzureResult<Self> {
        Ok(Self {
            http: SignedClient::new(config)?,
            container: config.container_name.clone(),
            container_url: endpoint_with_segment(&config.blob_endpoint(), &config.container_name)?,
        })
    }

    /// Fetches one listing segment starting at `marker`.
    pub async fn list_page(&self, marker: Option<&str>) -> AzureResult<BlobPage> {
        let mut url = self.container_url.clone();
        url.query_pairs_mut()
            .append_pair("restype", "container")
            .append_pair("comp", "list");
        if let Some(marker) = marker {
            url.query_pairs_mut().append_pair("marker", marker);
        }

        let resp = self.http.send(Method::GET, url, HeaderMap::new(), None).await?;
        if resp.status() != StatusCode::OK {
            return Err(status_error("list blobs", &self.container, &resp));
        }
        parse_blob_listing(&resp.text().await?)
    }

    /// Lists every blob name, following markers until the last segment.
    pub async fn list_names(&self) -> AzureResult<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self.list_page(marker.as_deref()).await?;
            names.extend(page.names);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        debug!("listed {} blobs in container {}", names.len(), self.container);
        Ok(names)
    }
}
