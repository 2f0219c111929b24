use redis::AsyncCommands;
use redis::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Movie(String),
}

impl CacheKey {
    /// Counter bumped on every invalidation of this key
    fn generation_key(&self) -> String {
        format!("{}:gen", self)
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Movie(imdb_id) => write!(f, "movie:{}", imdb_id),
        }
    }
}

/// Creates a Redis client for caching
///
/// Opening the client does not connect; connections are made per operation.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Stored value tagged with the generation it was read under
#[derive(Serialize, Deserialize)]
struct CachedEntry<T> {
    generation: u64,
    value: T,
}

/// Result of a cache lookup
#[derive(Debug, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    /// Fill with this generation so a concurrent invalidation wins
    Miss { generation: u64 },
}

/// Read-through cache in front of the catalog store
///
/// Every Redis round trip is bounded by `timeout`. Entries are tagged with the
/// key's generation; `invalidate` bumps it, so a fill computed from a row read
/// before the invalidation is never served.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    timeout: Duration,
}

impl Cache {
    pub fn new(redis_client: Client, timeout: Duration) -> Self {
        Self {
            redis_client,
            timeout,
        }
    }

    /// Looks up `key` together with its current generation
    pub async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<CacheLookup<T>> {
        let client = self.redis_client.clone();
        let (cached, generation): (Option<String>, Option<u64>) = bounded(
            "lookup",
            self.timeout,
            async move {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let reply: (Option<String>, Option<u64>) = redis::cmd("MGET")
                    .arg(key.to_string())
                    .arg(key.generation_key())
                    .query_async(&mut conn)
                    .await?;
                Ok::<_, AppError>(reply)
            },
        )
        .await?;

        decode_lookup(cached, generation)
    }

    /// Stores `value` under `generation` without waiting for the write
    pub fn fill_in_background<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        generation: u64,
        ttl: u64,
    ) {
        let json = match serde_json::to_string(&CachedEntry { generation, value }) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let client = self.redis_client.clone();
        let timeout = self.timeout;
        let key = key.to_string();
        tokio::spawn(async move {
            let write = bounded("fill", timeout, async move {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let _: () = conn.set_ex(&key, json, ttl).await?;
                Ok::<_, AppError>(())
            });
            if let Err(e) = write.await {
                tracing::warn!(error = %e, "Failed to fill movie cache");
            }
        });
    }

    /// Drops the cached value and retires its generation
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        let client = self.redis_client.clone();
        bounded("invalidate", self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _: () = redis::pipe()
                .atomic()
                .incr(key.generation_key(), 1)
                .ignore()
                .del(key.to_string())
                .ignore()
                .query_async(&mut conn)
                .await?;
            Ok::<_, AppError>(())
        })
        .await
    }
}

async fn bounded<T, F>(operation: &'static str, timeout: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "Cache call timed out"
            );
            Err(AppError::Storage(format!("cache {} timed out", operation)))
        }
    }
}

/// An entry written under an older generation counts as a miss
fn decode_lookup<T: DeserializeOwned>(
    cached: Option<String>,
    generation: Option<u64>,
) -> AppResult<CacheLookup<T>> {
    let generation = generation.unwrap_or(0);

    let Some(json) = cached else {
        return Ok(CacheLookup::Miss { generation });
    };

    let entry: CachedEntry<T> = serde_json::from_str(&json)
        .map_err(|e| AppError::Internal(format!("Cache deserialization error: {}", e)))?;

    if entry.generation == generation {
        Ok(CacheLookup::Hit(entry.value))
    } else {
        Ok(CacheLookup::Miss { generation })
    }
}
