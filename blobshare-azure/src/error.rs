//! Azure transport error types.

use thiserror::Error;

/// Result type for Azure transport operations.
pub type AzureResult<T> = Result<T, AzureError>;

/// Errors raised while configuring or talking to Azure Storage.
#[derive(Debug, Error)]
pub enum AzureError {
    #[error("environment variable {0} not found")]
    MissingVariable(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("blob operation failed: {0}")]
    Blob(#[from] object_store::Error),

    #[error("{operation} failed for /{path}: HTTP {status}{}", code_suffix(.code))]
    Share {
        operation: &'static str,
        path: String,
        status: u16,
        code: Option<String>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("malformed listing response: {0}")]
    Xml(#[from] quick_xml::DeError),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}
