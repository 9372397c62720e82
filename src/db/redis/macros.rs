/// Read-through caching over a [`Cache`](crate::db::Cache).
///
/// Returns the cached value when present. On a miss, or when the cache itself
/// cannot be read, the block is awaited, its value is queued for a background
/// write with the given TTL, and returned. Errors from the block propagate.
///
/// # Arguments
/// * `$cache`: a value with `get_from_cache` and `set_in_background` methods.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live in seconds for a freshly computed value.
/// * `$block`: a future producing `AppResult<T>`.
///
/// # Example
/// ```rust,ignore
/// cached!(cache, CacheKey::Records { .. }, 300, async move {
///     store.find_records(collection, &filter, limit).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, using source");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
