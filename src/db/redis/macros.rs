/// Wraps a fallible fetch with an optional Redis read-through cache.
///
/// `$cache` is an `Option<&Cache>`. On a hit the cached value is returned.
/// On a miss, or when the cache fails or times out, the block runs and a
/// successful result is queued for storage. Errors are never cached, and a
/// cache failure never fails the fetch.
///
/// # Example
/// ```rust,ignore
/// let details: ApiMovieDetails = cached!(self.cache.as_ref(), key, TTL, async move {
///     self.get_json(&url).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let cache: Option<&$crate::db::Cache> = $cache;
        let key = $key;

        let hit = match cache {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, bypassing cache");
                    None
                }
            },
            None => None,
        };

        match hit {
            Some(cached) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            None => match $block.await {
                Ok(value) => {
                    if let Some(cache) = cache {
                        cache.set_in_background(&key, &value, $ttl);
                    }
                    Ok(value)
                }
                Err(e) => Err(e),
            },
        }
    }};
}
