use crate::services::geo_math;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
///
/// Compared by exact value equality, which is what duplicate removal and
/// endpoint checks rely on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(GeoPoint { lat, lng })
    }

    /// Haversine distance in kilometers
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        geo_math::distance_km(self, other)
    }

    /// Squared distance in raw degree space. Only meaningful for ranking
    /// nearby candidates, never as a length.
    pub fn flat_separation(&self, other: &GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        dlat * dlat + dlng * dlng
    }

    /// `[lng, lat]` ordering used by GeoJSON and the directions API
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_lng_lat(pair: [f64; 2]) -> Result<Self, String> {
        GeoPoint::new(pair[1], pair[0])
    }

    /// Parse a `"lat,lng"` pair as sent by the map client.
    pub fn parse_lat_lng(text: &str) -> Result<Self, String> {
        let mut parts = text.split(',');
        let (lat, lng) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lng), None) => (lat.trim(), lng.trim()),
            _ => return Err(format!("Malformed coordinate pair: '{}'", text)),
        };
        let lat: f64 = lat
            .parse()
            .map_err(|_| format!("Malformed latitude in '{}'", text))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| format!("Malformed longitude in '{}'", text))?;
        GeoPoint::new(lat, lng)
    }
}
