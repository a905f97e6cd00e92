//! Object store contract consumed by the push pass.

use crate::error::BoxError;
use async_trait::async_trait;
use bytes::Bytes;

/// Read access to the container being mirrored.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Returns the name of every object in the container.
    ///
    /// Implementations handle provider pagination internally.
    async fn list_object_names(&self) -> Result<Vec<String>, BoxError>;

    /// Reads the full content of one object.
    async fn fetch_object(&self, name: &str) -> Result<Bytes, BoxError>;
}
