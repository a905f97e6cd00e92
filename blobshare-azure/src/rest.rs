//! SharedKey-signed HTTP requests against Azure Storage services.

use crate::config::MirrorConfig;
use crate::error::{AzureError, AzureResult};
use crate::shared_key::SharedKeyCredential;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use std::time::Duration;
use tracing::debug;

/// REST API version sent with every request.
pub const API_VERSION: &str = "2023-11-03";

/// HTTP client that signs every request with the account key.
pub struct SignedClient {
    client: Client,
    credential: SharedKeyCredential,
}

impl SignedClient {
    pub fn new(config: &MirrorConfig) -> AzureResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let credential = SharedKeyCredential::new(&config.account_name, &config.account_key)?;
        Ok(Self { client, credential })
    }

    /// Adds the date, version and `Authorization` headers, then sends.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        mut headers: HeaderMap,
        body: Option<Bytes>,
    ) -> AzureResult<Response> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        headers.insert("x-ms-date", HeaderValue::from_str(&date)?);
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));

        let content_length = body.as_ref().map_or(0, Bytes::len);
        let authorization = self
            .credential
            .authorization(&method, &url, &headers, content_length)?;
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);

        debug!("{method} {url}");
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        Ok(request.send().await?)
    }
}

/// Parses `endpoint` and appends `segment` as one more path segment.
pub fn endpoint_with_segment(endpoint: &str, segment: &str) -> AzureResult<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| AzureError::Config(format!("invalid endpoint {endpoint}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| AzureError::Config(format!("endpoint {endpoint} cannot be a base URL")))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Value of the `x-ms-error-code` response header, if any.
pub fn error_code(resp: &Response) -> Option<String> {
    resp.headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Builds an [`AzureError::Share`] for an unexpected response status.
pub fn status_error(operation: &'static str, path: &str, resp: &Response) -> AzureError {
    AzureError::Share {
        operation,
        path: path.to_string(),
        status: resp.status().as_u16(),
        code: error_code(resp),
    }
}
