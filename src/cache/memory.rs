use crate::cache::{directions_cache_key, CacheStats};
use crate::models::{GeoPoint, Path, RoutingOptions};
use crate::services::directions::{DirectionsClient, DirectionsError};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Directions client wrapper that memoizes successful responses in moka with
/// TTL and bounded capacity. Errors are never cached.
pub struct CachedDirectionsClient {
    inner: Arc<dyn DirectionsClient>,
    paths: Cache<String, Arc<Path>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedDirectionsClient {
    pub fn new(inner: Arc<dyn DirectionsClient>, ttl_seconds: u64, max_capacity: u64) -> Self {
        let paths = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        CachedDirectionsClient {
            inner,
            paths,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.paths.entry_count(),
        }
    }
}

#[async_trait]
impl DirectionsClient for CachedDirectionsClient {
    async fn request(
        &self,
        coordinates: &[GeoPoint],
        options: &RoutingOptions,
    ) -> Result<Path, DirectionsError> {
        let key = directions_cache_key(coordinates, options);

        if let Some(path) = self.paths.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Directions cache hit: {}", key);
            return Ok((*path).clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Directions cache miss: {}", key);

        let path = self.inner.request(coordinates, options).await?;
        self.paths.insert(key, Arc::new(path.clone())).await;
        Ok(path)
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.stats())
    }
}
