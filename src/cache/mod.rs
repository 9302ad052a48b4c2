pub mod memory;

use crate::constants::CACHE_KEY_COORDINATE_DECIMALS;
use crate::models::{GeoPoint, RoutingOptions};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use memory::CachedDirectionsClient;

/// Generate a cache key for a directions request.
/// Key includes: profile, coordinates (6 decimal precision, ~0.1m), avoided
/// features and weightings (3 decimal precision)
pub fn directions_cache_key(coordinates: &[GeoPoint], options: &RoutingOptions) -> String {
    let mut hasher = DefaultHasher::new();
    let scale = 10f64.powi(CACHE_KEY_COORDINATE_DECIMALS);

    options.profile.profile().hash(&mut hasher);
    coordinates.len().hash(&mut hasher);
    for c in coordinates {
        ((c.lat * scale).round() as i64).hash(&mut hasher);
        ((c.lng * scale).round() as i64).hash(&mut hasher);
    }

    // BTreeSet iteration is ordered, so the hash is stable
    options.avoid_features.hash(&mut hasher);

    let w = &options.weightings;
    for factor in [w.steepness_difficulty, w.green, w.quiet] {
        ((factor * 1000.0).round() as i64).hash(&mut hasher);
    }

    format!("directions:{}:{:x}", options.profile, hasher.finish())
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}
