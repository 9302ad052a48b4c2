use crate::constants::{EARTH_RADIUS_KM, METERS_PER_DEGREE_LAT, METERS_PER_DEGREE_LNG_EQUATOR};
use crate::models::GeoPoint;

/// Great-circle distance between two points using the Haversine formula.
/// Returns distance in kilometers.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Sum of consecutive haversine distances along `points`
pub fn polyline_length_km(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| distance_km(&w[0], &w[1])).sum()
}

/// Running distance from the first point; element 0 is always 0.
pub fn cumulative_distances_km(points: &[GeoPoint]) -> Vec<f64> {
    let mut dists = Vec::with_capacity(points.len());
    let mut total = 0.0;
    if !points.is_empty() {
        dists.push(0.0);
    }
    for w in points.windows(2) {
        total += distance_km(&w[0], &w[1]);
        dists.push(total);
    }
    dists
}

/// Move `radius_m` meters away from `origin` along `direction` (radians,
/// counterclockwise from east), using a flat local tangent plane.
///
/// The result is not range-checked: guide points are only hints to the
/// directions provider, which snaps them to the road network.
pub fn offset_point(origin: &GeoPoint, direction: f64, radius_m: f64) -> GeoPoint {
    let dx = radius_m * direction.cos();
    let dy = radius_m * direction.sin();
    let delta_lat = dy / METERS_PER_DEGREE_LAT;
    let delta_lng = dx / (METERS_PER_DEGREE_LNG_EQUATOR * origin.lat.to_radians().cos());
    GeoPoint {
        lat: origin.lat + delta_lat,
        lng: origin.lng + delta_lng,
    }
}
