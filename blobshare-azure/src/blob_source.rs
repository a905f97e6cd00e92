//! Blob container source backed by `object_store`.
//!
//! Content is read through any `ObjectStore`; the in-memory store stands in
//! for a container in tests. Against Azure, names are listed with
//! [`ContainerListClient`] so they reach the engine unmodified.

use crate::config::MirrorConfig;
use crate::container::ContainerListClient;
use crate::error::AzureResult;
use async_trait::async_trait;
use blobshare_mirror::{BoxError, ObjectSource};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path;
use std::sync::Arc;
use tracing::debug;

enum NameListing {
    /// `object_store` listing; names arrive in normalized path form.
    Store,
    Container(ContainerListClient),
}

/// Reads every blob of one container.
pub struct BlobSource {
    store: Arc<dyn ObjectStore>,
    container: String,
    listing: NameListing,
}

impl BlobSource {
    pub fn new(store: Arc<dyn ObjectStore>, container: impl Into<String>) -> Self {
        Self {
            store,
            container: container.into(),
            listing: NameListing::Store,
        }
    }

    /// Lists names through `client` instead of the object store.
    pub fn with_listing_client(mut self, client: ContainerListClient) -> Self {
        self.listing = NameListing::Container(client);
        self
    }

    /// Connects to the container named in `config` using the account key.
    pub fn from_config(config: &MirrorConfig) -> AzureResult<Self> {
        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(&config.account_name)
            .with_access_key(&config.account_key)
            .with_container_name(&config.container_name);

        if let Some(endpoint) = &config.blob_endpoint_override {
            builder = builder.with_endpoint(endpoint.clone()).with_allow_http(true);
        }

        let source = Self::new(Arc::new(builder.build()?), &config.container_name);
        Ok(source.with_listing_client(ContainerListClient::new(config)?))
    }

    /// Lists every blob name in the container, across all result pages.
    pub async fn list_names(&self) -> AzureResult<Vec<String>> {
        match &self.listing {
            NameListing::Container(client) => client.list_names().await,
            NameListing::Store => {
                let objects: Vec<_> = self.store.list(None).try_collect().await?;
                let names: Vec<String> = objects
                    .into_iter()
                    .map(|meta| meta.location.to_string())
                    .collect();

                debug!("listed {} blobs in container {}", names.len(), self.container);
                Ok(names)
            }
        }
    }

    /// Downloads the full content of one blob.
    ///
    /// Fails for names that are not valid `object_store` paths, such as
    /// names with empty or relative segments.
    pub async fn fetch(&self, name: &str) -> AzureResult<Bytes> {
        let location = Path::parse(name).map_err(object_store::Error::from)?;
        let bytes = self.store.get(&location).await?.bytes().await?;

        debug!(
            "downloaded {} bytes from {}/{name}",
            bytes.len(),
            self.container
        );
        Ok(bytes)
    }
}

#[async_trait]
impl ObjectSource for BlobSource {
    async fn list_object_names(&self) -> Result<Vec<String>, BoxError> {
        Ok(self.list_names().await?)
    }

    async fn fetch_object(&self, name: &str) -> Result<Bytes, BoxError> {
        Ok(self.fetch(name).await?)
    }
}
