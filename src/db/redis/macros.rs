/// A macro to simplify read-through caching with an optional Redis cache.
///
/// When a cache is configured the value is looked up first; on a miss the
/// provided block computes it and the result is filled in the background
/// under the generation seen by the lookup. A failed lookup is logged and
/// the block is awaited as if no cache were configured.
///
/// # Arguments
/// * `$cache`: An `Option<&Cache>`.
/// * `$key`: The `CacheKey` to use for caching the value.
/// * `$ttl`: The time-to-live (TTL) for the cached value in seconds.
/// * `$block`: The future to await if the value is not found in cache.
///
/// # Example
/// ```rust,ignore
/// let movie = cached!(self.cache.as_ref(), CacheKey::Movie(id), 300, async move {
///     load_movie(id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache {
            Some(cache) => match cache.lookup(&key).await {
                Ok($crate::db::redis::CacheLookup::Hit(hit)) => Ok(hit),
                Ok($crate::db::redis::CacheLookup::Miss { generation }) => {
                    let value = $block.await?;
                    cache.fill_in_background(&key, &value, generation, $ttl);
                    Ok(value)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Cache lookup failed, reading from store");
                    $block.await
                }
            },
            None => $block.await,
        }
    }};
}
