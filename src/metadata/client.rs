//! Item metadata fetcher.
//!
//! Resolves an item id to its metadata through the shared single-flight
//! cache. The wire is behind the `Transport` trait so the pipeline can run
//! against `reqwest` in production and a recording mock in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::FutureExt;

use crate::config::EnhancerConfig;
use crate::error::FetchError;
use crate::metadata::cache::{CacheKey, Entry, FetchOutcome, MetadataCache};
use crate::metadata::credentials::CredentialSource;
use crate::metadata::model::ItemMetadata;

/// Header carrying the session token on Jellyfin/Emby servers.
pub const TOKEN_HEADER: &str = "X-Emby-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network seam.
///
/// Implementations report a response for any status; only failures that
/// produce no response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FetchError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FetchError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Per-call fetch options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub fields: Vec<String>,
    /// Bypass the cache and overwrite whatever entry is there.
    pub force_refresh: bool,
}

impl FetchRequest {
    pub fn new(fields: &[String]) -> Self {
        Self {
            fields: fields.to_vec(),
            force_refresh: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// Fetches item metadata and owns the cache behind it.
pub struct ItemFetcher {
    config: EnhancerConfig,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
    cache: MetadataCache,
}

impl ItemFetcher {
    pub fn new(
        config: EnhancerConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            config,
            transport,
            credentials,
            cache: MetadataCache::new(),
        }
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    /// Resolve `item_id` to its metadata.
    ///
    /// Concurrent calls for the same (id, field set) share one request and
    /// resolve to the same `Arc`. A failed request leaves no cache entry,
    /// even when the caller that started it gave up waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn fetch(&self, item_id: &str, request: &FetchRequest) -> FetchOutcome {
        if item_id.is_empty() {
            return Err(FetchError::InvalidArgument("itemId required".to_string()));
        }
        let base = self.config.api_base()?;
        let token = self.credentials.access_token()?;

        let key = CacheKey::new(item_id, &request.fields);
        let mut started = false;
        let entry = self.cache.get_or_start(&key, request.force_refresh, || {
            started = true;
            log::debug!(
                "ITEM_FETCH_START key={} force_refresh={}",
                key,
                request.force_refresh
            );
            let http = TransportRequest {
                method: Method::Get,
                url: item_url(&base, item_id, &request.fields, &token),
                headers: self.compat_headers(),
            };
            let transport = Arc::clone(&self.transport);
            async move {
                let response = transport.send(http).await?;
                if !response.is_success() {
                    return Err(FetchError::Transport {
                        status: response.status,
                    });
                }
                let item = ItemMetadata::from_slice(&response.body)
                    .map_err(|e| FetchError::Decode(e.to_string()))?;
                Ok(Arc::new(item))
            }
            .boxed()
        });

        let fetch = match entry {
            Entry::Ready(item) => {
                log::debug!("ITEM_CACHE_HIT key={}", key);
                return Ok(item);
            }
            Entry::Pending(fetch) => fetch,
        };

        if started {
            // Runs to completion even if every caller stops waiting
            tokio::spawn(fetch.clone());
        }
        let outcome = fetch.await;
        if let Err(e) = &outcome {
            log::debug!("ITEM_FETCH_FAILED key={} error={}", key, e);
        }
        outcome
    }

    /// Delete an item on the server and forget everything cached for it.
    pub async fn delete_item(&self, item_id: &str) -> Result<(), FetchError> {
        if item_id.is_empty() {
            return Err(FetchError::InvalidArgument("itemId required".to_string()));
        }
        let base = self.config.api_base()?;
        let token = self.credentials.access_token()?;

        let request = TransportRequest {
            method: Method::Delete,
            url: format!("{}/Items/{}", base, urlencoding::encode(item_id)),
            headers: vec![
                (TOKEN_HEADER.to_string(), token),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
        };
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            log::warn!(
                "ITEM_DELETE_FAILED item={} status={}",
                item_id,
                response.status
            );
            return Err(FetchError::Transport {
                status: response.status,
            });
        }

        let dropped = self.cache.invalidate_item(item_id);
        log::info!("ITEM_DELETED item={} cache_entries_dropped={}", item_id, dropped);
        Ok(())
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn compat_headers(&self) -> Vec<(String, String)> {
        match self.config.token.as_deref() {
            Some(token) if !token.is_empty() => {
                vec![(TOKEN_HEADER.to_string(), token.to_string())]
            }
            _ => Vec::new(),
        }
    }
}

/// `{base}/Items/{id}?Fields={csv}&api_key={token}`
fn item_url<S: AsRef<str>>(base: &str, item_id: &str, fields: &[S], token: &str) -> String {
    let mut query = Vec::new();
    if !fields.is_empty() {
        let csv = fields.iter().map(|f| f.as_ref()).collect::<Vec<_>>().join(",");
        query.push(format!("Fields={}", urlencoding::encode(&csv)));
    }
    query.push(format!("api_key={}", urlencoding::encode(token)));
    format!(
        "{}/Items/{}?{}",
        base,
        urlencoding::encode(item_id),
        query.join("&")
    )
}
