//! Azure transports for the blobshare mirror engine.
//!
//! Provides:
//! - Environment-driven configuration
//! - A blob container source over `object_store`, listing raw blob names
//! - An Azure Files REST client with SharedKey request signing

pub mod blob_source;
pub mod config;
pub mod container;
pub mod error;
pub mod file_share;
pub mod listing;
pub mod rest;
pub mod shared_key;

pub use blob_source::BlobSource;
pub use config::MirrorConfig;
pub use container::ContainerListClient;
pub use error::{AzureError, AzureResult};
pub use file_share::FileShareClient;

use blobshare_mirror::{EngineOptions, MirrorEngine};
use std::sync::Arc;

/// Builds a mirror engine wired to the container and share named in
/// `config`. No network requests are made.
pub fn build_engine(config: &MirrorConfig) -> AzureResult<MirrorEngine> {
    let source = BlobSource::from_config(config)?;
    let share = FileShareClient::new(config)?;

    Ok(MirrorEngine::new(
        Arc::new(source),
        Arc::new(share),
        EngineOptions {
            cache_control: config.cache_control.clone(),
        },
    ))
}
