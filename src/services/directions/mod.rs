pub mod openroute;

use crate::cache::CacheStats;
use crate::error::Result;
use crate::models::{DirectionsRequest, GeoPoint, Path, RoutingOptions};
use async_trait::async_trait;
use thiserror::Error;

pub use openroute::OpenRouteServiceClient;

/// Failure reported by a directions provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectionsError {
    /// The coordinate at `index` could not be snapped to the road network.
    /// Retrying without it may succeed.
    #[error("Could not find routable point at coordinate {index}: {message}")]
    UnroutablePoint { index: usize, message: String },

    /// The provider refuses routes this long; not retryable.
    #[error("Route too large: {0}")]
    RouteTooLarge(String),

    #[error("No route found")]
    NoRoute,

    #[error("Invalid directions request: {0}")]
    InvalidRequest(String),

    #[error("Directions request failed: {0}")]
    Transport(String),
}

/// External routing service: turns an ordered coordinate list into a road path.
#[async_trait]
pub trait DirectionsClient: Send + Sync {
    async fn request(
        &self,
        coordinates: &[GeoPoint],
        options: &RoutingOptions,
    ) -> std::result::Result<Path, DirectionsError>;

    /// Short identifier for health reporting
    fn backend_name(&self) -> &'static str;

    /// Cache counters, for clients that cache
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

/// A routed loop together with the waypoints that were actually used
#[derive(Debug, Clone)]
pub struct RoutedLoop {
    pub path: Path,
    pub waypoints: Vec<GeoPoint>,
}

/// Request directions for `request`, dropping waypoints the provider cannot
/// route to and retrying.
///
/// Each retry removes one waypoint, so this terminates. An unroutable base
/// location cannot be recovered from and is returned as an error.
pub async fn request_with_recovery(
    client: &dyn DirectionsClient,
    request: &DirectionsRequest,
) -> Result<RoutedLoop> {
    let options = request.routing_options();
    let mut waypoints = request.waypoints.clone();

    loop {
        let coordinates = request.with_waypoints(waypoints.clone()).coordinates();

        match client.request(&coordinates, &options).await {
            Ok(path) => {
                tracing::debug!(
                    coordinates = coordinates.len(),
                    path_points = path.len(),
                    distance_km = %format!("{:.2}", path.distance_km()),
                    "Directions: {} coordinates -> {} path points",
                    coordinates.len(),
                    path.len()
                );
                return Ok(RoutedLoop { path, waypoints });
            }
            Err(DirectionsError::UnroutablePoint { index, message })
                if (1..=waypoints.len()).contains(&index) =>
            {
                let dropped = waypoints.remove(index - 1);
                tracing::warn!(
                    index,
                    lat = dropped.lat,
                    lng = dropped.lng,
                    remaining = waypoints.len(),
                    "Coordinate {} ({}, {}) is not routable, retrying without it: {}",
                    index,
                    dropped.lat,
                    dropped.lng,
                    message
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::TravelMode;
    use std::sync::Mutex;

    /// Rejects any coordinate listed in `unroutable`, echoing the rest.
    struct Picky {
        unroutable: Vec<GeoPoint>,
        calls: Mutex<Vec<Vec<GeoPoint>>>,
    }

    #[async_trait]
    impl DirectionsClient for Picky {
        async fn request(
            &self,
            coordinates: &[GeoPoint],
            _options: &RoutingOptions,
        ) -> std::result::Result<Path, DirectionsError> {
            self.calls.lock().unwrap().push(coordinates.to_vec());
            if let Some(index) = coordinates.iter().position(|c| self.unroutable.contains(c)) {
                return Err(DirectionsError::UnroutablePoint {
                    index,
                    message: "no road nearby".to_string(),
                });
            }
            Ok(Path::from_points(coordinates))
        }

        fn backend_name(&self) -> &'static str {
            "picky"
        }
    }

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[tokio::test]
    async fn test_drops_unroutable_waypoints() {
        let base = p(42.30, -71.30);
        let lake = p(42.31, -71.29);
        let island = p(42.32, -71.31);
        let client = Picky {
            unroutable: vec![lake, island],
            calls: Mutex::new(vec![]),
        };
        let good = p(42.29, -71.31);
        let request =
            DirectionsRequest::new(base, vec![lake, good, island], TravelMode::CyclingRegular);

        let routed = tokio_test::assert_ok!(request_with_recovery(&client, &request).await);
        assert_eq!(routed.waypoints, vec![good]);
        assert_eq!(routed.path.len(), 3);
        assert_eq!(client.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unroutable_base_is_terminal() {
        let base = p(42.30, -71.30);
        let client = Picky {
            unroutable: vec![base],
            calls: Mutex::new(vec![]),
        };
        let request =
            DirectionsRequest::new(base, vec![p(42.31, -71.29)], TravelMode::FootWalking);

        let err = tokio_test::assert_err!(request_with_recovery(&client, &request).await);
        assert!(matches!(err, AppError::UnroutablePoint { index: 0, .. }));
        assert_eq!(client.calls.lock().unwrap().len(), 1);
    }
}
