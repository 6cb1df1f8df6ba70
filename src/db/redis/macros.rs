/// A macro to simplify caching logic using Redis.
///
/// `$cache` is an `Option<&Cache>`; with `None` the block is simply awaited.
/// Otherwise a cached value is returned when present, and on a miss the block
/// is awaited and its value queued for caching. A failed cache read is logged
/// and the block is awaited instead.
///
/// # Arguments
/// * `$cache`: optional cache with `get_from_cache` and `set_in_background` methods.
/// * `$key`: The key to use for caching the value.
/// * `$ttl`: The time-to-live (TTL) for the cached value in seconds.
/// * `$block`: The future to await if the value is not found in cache.
///
/// # Example
/// ```ignore
/// let ranked: Vec<RankedVariant> = cached!(state.cache.as_ref(), key, 60, async move {
///     rank_catalog(&catalog, &preferences).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache {
            Some(cache) => match cache.get_from_cache(&$key).await {
                Ok(Some(cached)) => {
                    tracing::debug!(key = %$key, "Cache hit");
                    Ok(cached)
                }
                Ok(None) => match $block.await {
                    Ok(value) => {
                        cache.set_in_background(&$key, &value, $ttl);
                        Ok(value)
                    }
                    Err(e) => Err(e),
                },
                Err(e) => {
                    tracing::warn!(key = %$key, error = %e, "Cache read failed, computing value");
                    $block.await
                }
            },
            None => $block.await,
        }
    }};
}
