//! Fetching a target URL through a forward proxy

use crate::error::ProbeError;
use crate::proxy::models::ProxyAddress;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Proxy as ReqwestProxy};

/// Raw response received through a proxy
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs one GET of `target_url` routed through `proxy`.
///
/// Implementations must be cancel-safe: the checker drops the returned
/// future when its deadline passes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, proxy: &ProxyAddress, target_url: &str)
        -> Result<FetchResponse, ProbeError>;
}

/// Default cap on how much of a response body is read
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// [`Fetcher`] backed by a fresh reqwest client per proxy
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    body_limit: usize,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop reading a body after `limit` bytes; the rest is discarded
    pub fn with_body_limit(limit: usize) -> Self {
        Self { body_limit: limit }
    }

    /// Create a reqwest client that sends all traffic through the proxy
    fn create_client(&self, proxy: &ProxyAddress) -> Result<Client, ProbeError> {
        if proxy.host().is_empty() || proxy.port().is_empty() {
            return Err(ProbeError::Client(format!(
                "{} is not in host:port form",
                proxy
            )));
        }

        let reqwest_proxy =
            ReqwestProxy::all(proxy.url()).map_err(|e| ProbeError::Client(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));

        Client::builder()
            .proxy(reqwest_proxy)
            .default_headers(headers)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        proxy: &ProxyAddress,
        target_url: &str,
    ) -> Result<FetchResponse, ProbeError> {
        let client = self.create_client(proxy)?;
        let mut response = client.get(target_url).send().await?;
        let status = response.status().as_u16();

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| ProbeError::Network {
            status: Some(status),
            message: e.to_string(),
        })? {
            let room = self.body_limit - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                trim_partial_char(&mut body);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchResponse { status, body })
    }
}

/// Drop a UTF-8 sequence cut off by truncation so the prefix still decodes
fn trim_partial_char(body: &mut Vec<u8>) {
    let valid = match std::str::from_utf8(body) {
        Err(e) if e.error_len().is_none() => Some(e.valid_up_to()),
        _ => None,
    };
    if let Some(len) = valid {
        body.truncate(len);
    }
}
