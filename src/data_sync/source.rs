use crate::constants::USER_AGENT;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Read-only access to a JSON-over-HTTP API.
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Plain unauthenticated GET client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonSource for HttpSource {
    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|e| SyncError::http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let body = response.text().await.map_err(|e| SyncError::http(url, e))?;
        decode_body(url, &body)
    }
}

/// A body that is not JSON is a payload problem, not a network one.
fn decode_body(url: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| SyncError::payload(url, e))
}

/// Enforces a fixed pause between two consecutive requests, whichever caller issues them.
pub struct ThrottledSource {
    inner: Arc<dyn JsonSource>,
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl ThrottledSource {
    pub fn new(inner: Arc<dyn JsonSource>, delay: Duration) -> Self {
        Self { inner, delay, last_request: Mutex::new(None) }
    }

    fn mark(&self) {
        *self.last_request.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}

#[async_trait]
impl JsonSource for ThrottledSource {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let last = *self.last_request.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = last {
            tokio::time::sleep_until(last + self.delay).await;
        }

        let outcome = self.inner.get_json(url).await;
        self.mark();
        outcome
    }
}

/// Keeps every successful response on disk, keyed by a hash of the URL.
///
/// Cache read and write failures are logged and bypassed; only the inner source can fail a request.
pub struct CachedSource {
    inner: Arc<dyn JsonSource>,
    cache_dir: PathBuf,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn JsonSource>, cache_dir: impl Into<PathBuf>) -> Self {
        Self { inner, cache_dir: cache_dir.into() }
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.cache_dir.join(format!("{:x}.json", digest))
    }
}

#[async_trait]
impl JsonSource for CachedSource {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let path = self.cache_path(url);

        if let Ok(raw) = tokio::fs::read_to_string(&path).await {
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache hit for {}", url);
                    return Ok(value);
                }
                Err(e) => warn!("Ignoring corrupt cache entry {}: {}", path.display(), e),
            }
        }

        let value = self.inner.get_json(url).await?;

        if let Err(e) = tokio::fs::create_dir_all(&self.cache_dir).await {
            warn!("Cannot create cache dir {}: {}", self.cache_dir.display(), e);
        } else if let Err(e) = tokio::fs::write(&path, value.to_string()).await {
            warn!("Cannot write cache entry {}: {}", path.display(), e);
        }

        Ok(value)
    }
}
