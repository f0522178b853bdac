/// Read-through caching against Redis.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// hands the result to the background writer with a TTL of `$ttl` seconds and
/// returns it. A failed cache read is logged and treated as a miss, so an
/// unreachable Redis never fails the request. The cache must expose
/// `get_from_cache` and `set_in_background`.
/// The expansion is a `Result`, meant as the tail of a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// async fn recommendations(cache: &Cache, user: UserId) -> AppResult<Vec<FilmId>> {
///     cached!(cache, CacheKey::Recommendations { user, limit: 10 }, 60, async move {
///         compute_recommendations(user, 10).await
///     })
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let cached = match $cache.get_from_cache(&key).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed");
                None
            }
        };
        if let Some(cached) = cached {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            tracing::debug!(key = %key, "Cache miss");
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
