//! Azure Storage SharedKey request signing.
//!
//! The signature is an HMAC-SHA256, keyed with the decoded account key, over
//! a canonical string built from the verb, a fixed list of standard headers,
//! every `x-ms-*` header and the canonicalized resource.

use crate::error::{AzureError, AzureResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Standard headers that take part in the string-to-sign, in order.
/// `Content-Length` is handled separately.
const SIGNED_HEADERS_BEFORE_LENGTH: [&str; 2] = ["content-encoding", "content-language"];
const SIGNED_HEADERS_AFTER_LENGTH: [&str; 8] = [
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

/// Account name plus decoded access key.
#[derive(Clone)]
pub struct SharedKeyCredential {
    account: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl SharedKeyCredential {
    pub fn new(account: impl Into<String>, base64_key: &str) -> AzureResult<Self> {
        let key = STANDARD
            .decode(base64_key)
            .map_err(|e| AzureError::Config(format!("account key is not valid base64: {e}")))?;
        Ok(Self {
            account: account.into(),
            key,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Builds the canonical string-to-sign for a request.
    ///
    /// `content_length` is the body length; zero is signed as an empty value.
    pub fn string_to_sign(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        content_length: usize,
    ) -> String {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        let mut lines = vec![method.as_str().to_string()];
        lines.extend(SIGNED_HEADERS_BEFORE_LENGTH.iter().map(|h| header(h)));
        lines.push(if content_length == 0 {
            String::new()
        } else {
            content_length.to_string()
        });
        lines.extend(SIGNED_HEADERS_AFTER_LENGTH.iter().map(|h| header(h)));

        let mut signed = lines.join("\n");
        signed.push('\n');
        signed.push_str(&canonicalized_headers(headers));
        signed.push_str(&self.canonicalized_resource(url));
        signed
    }

    /// Returns the `Authorization` header value for a request.
    pub fn authorization(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        content_length: usize,
    ) -> AzureResult<String> {
        let string_to_sign = self.string_to_sign(method, url, headers, content_length);
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AzureError::Config(format!("unusable account key: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());
        Ok(format!("SharedKey {}:{signature}", self.account))
    }

    fn canonicalized_resource(&self, url: &Url) -> String {
        let mut resource = format!("/{}{}", self.account, url.path());

        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in url.query_pairs() {
            params
                .entry(name.to_lowercase())
                .or_default()
                .push(value.into_owned());
        }
        for (name, mut values) in params {
            values.sort();
            resource.push('\n');
            resource.push_str(&name);
            resource.push(':');
            resource.push_str(&values.join(","));
        }
        resource
    }
}

/// `x-ms-*` headers sorted by name, one `name:value\n` per header.
fn canonicalized_headers(headers: &HeaderMap) -> String {
    let mut ms_headers: BTreeMap<&str, &str> = BTreeMap::new();
    for (name, value) in headers {
        let name = name.as_str();
        if name.starts_with("x-ms-") {
            if let Ok(value) = value.to_str() {
                ms_headers.insert(name, value.trim());
            }
        }
    }

    ms_headers
        .into_iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect()
}
