//! Mirror configuration.
//!
//! Required values come from the environment; tunables fall back to the
//! defaults below when unset.

use crate::error::{AzureError, AzureResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest range accepted by a single Azure Files Put Range request.
pub const MAX_RANGE_BYTES: usize = 4 * 1024 * 1024;

/// Configuration for a mirror run.
#[derive(Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Storage account hosting both the container and the share.
    pub account_name: String,

    /// Base64 account access key. Never serialized.
    #[serde(skip_serializing, default)]
    pub account_key: String,

    /// Source blob container.
    pub container_name: String,

    /// Destination file share.
    pub share_name: String,

    /// Optional blob endpoint override (for Azurite in testing).
    pub blob_endpoint_override: Option<String>,

    /// Optional file endpoint override (for Azurite in testing).
    pub file_endpoint_override: Option<String>,

    /// Ranges of one file uploaded concurrently.
    pub upload_parallelism: usize,

    /// Size of each uploaded range, at most [`MAX_RANGE_BYTES`].
    pub upload_range_bytes: usize,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// `Cache-Control` header set on uploaded files.
    pub cache_control: Option<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            account_name: String::new(),
            account_key: String::new(),
            container_name: String::new(),
            share_name: String::new(),
            blob_endpoint_override: None,
            file_endpoint_override: None,
            upload_parallelism: 3,
            upload_range_bytes: MAX_RANGE_BYTES,
            request_timeout_secs: 60,
            cache_control: Some("no-transform".to_string()),
        }
    }
}

impl fmt::Debug for MirrorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorConfig")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("container_name", &self.container_name)
            .field("share_name", &self.share_name)
            .field("blob_endpoint_override", &self.blob_endpoint_override)
            .field("file_endpoint_override", &self.file_endpoint_override)
            .field("upload_parallelism", &self.upload_parallelism)
            .field("upload_range_bytes", &self.upload_range_bytes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cache_control", &self.cache_control)
            .finish()
    }
}

impl MirrorConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> AzureResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> AzureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(AzureError::MissingVariable(name));

        let defaults = Self::default();
        let config = Self {
            account_name: required("ACCOUNT_NAME")?,
            account_key: required("ACCOUNT_KEY")?,
            container_name: required("CONTAINER_NAME")?,
            share_name: required("SHARE_NAME")?,
            blob_endpoint_override: get("BLOB_ENDPOINT"),
            file_endpoint_override: get("FILE_ENDPOINT"),
            upload_parallelism: parse_or(
                get("UPLOAD_PARALLELISM"),
                "UPLOAD_PARALLELISM",
                defaults.upload_parallelism,
            )?,
            upload_range_bytes: parse_or(
                get("UPLOAD_RANGE_BYTES"),
                "UPLOAD_RANGE_BYTES",
                defaults.upload_range_bytes,
            )?,
            request_timeout_secs: parse_or(
                get("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            cache_control: defaults.cache_control,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks values that would otherwise only fail once requests start.
    pub fn validate(&self) -> AzureResult<()> {
        if STANDARD.decode(&self.account_key).is_err() {
            return Err(AzureError::Config(
                "ACCOUNT_KEY is not valid base64".to_string(),
            ));
        }
        if self.upload_parallelism == 0 {
            return Err(AzureError::Config(
                "UPLOAD_PARALLELISM must be at least 1".to_string(),
            ));
        }
        if self.upload_range_bytes == 0 || self.upload_range_bytes > MAX_RANGE_BYTES {
            return Err(AzureError::Config(format!(
                "UPLOAD_RANGE_BYTES must be between 1 and {MAX_RANGE_BYTES}"
            )));
        }
        for endpoint in [&self.blob_endpoint_override, &self.file_endpoint_override]
            .into_iter()
            .flatten()
        {
            reqwest::Url::parse(endpoint)
                .map_err(|e| AzureError::Config(format!("invalid endpoint {endpoint}: {e}")))?;
        }
        Ok(())
    }

    /// Blob service endpoint, without a trailing slash.
    pub fn blob_endpoint(&self) -> String {
        match &self.blob_endpoint_override {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.blob.core.windows.net", self.account_name),
        }
    }

    /// File service endpoint, without a trailing slash.
    pub fn file_endpoint(&self) -> String {
        match &self.file_endpoint_override {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.file.core.windows.net", self.account_name),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &str,
    default: T,
) -> AzureResult<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AzureError::Config(format!("{name} is not a valid number: {raw}"))),
        None => Ok(default),
    }
}
