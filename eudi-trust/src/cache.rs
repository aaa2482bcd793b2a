use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use moka::future::Cache;
use serde_json::Value;

use crate::HttpError;

/// Fetched JSON documents keyed by URL.
///
/// Failed fetches are never cached. Concurrent callers for the same key may
/// share one in-flight fetch.
#[async_trait]
pub trait FetchCache: Send + Sync {
    async fn get_or_fetch<'a>(
        &'a self,
        key: &'a str,
        fetch: BoxFuture<'a, Result<Value, HttpError>>,
    ) -> Result<Value, HttpError>;
}

pub struct MokaFetchCache {
    cache: Cache<String, Value>,
}

impl MokaFetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(1024)
                .build(),
        }
    }
}

#[async_trait]
impl FetchCache for MokaFetchCache {
    async fn get_or_fetch<'a>(
        &'a self,
        key: &'a str,
        fetch: BoxFuture<'a, Result<Value, HttpError>>,
    ) -> Result<Value, HttpError> {
        self.cache
            .try_get_with(key.to_string(), fetch)
            .await
            .map_err(|e| (*e).clone())
    }
}
