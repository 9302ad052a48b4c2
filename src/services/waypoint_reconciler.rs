use crate::error::{AppError, Result};
use crate::models::GeoPoint;

/// Move every waypoint onto the nearest point of `cleaned_path`, keeping the
/// waypoint order.
///
/// Nearness is squared distance in raw lat/lng degrees: only the ranking
/// matters, and the candidates are all within a few kilometers.
pub fn reconcile(previous: &[GeoPoint], cleaned_path: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
    if cleaned_path.is_empty() {
        return Err(AppError::EmptyPath);
    }

    Ok(previous
        .iter()
        .map(|waypoint| nearest_point(waypoint, cleaned_path))
        .collect())
}

fn nearest_point(target: &GeoPoint, candidates: &[GeoPoint]) -> GeoPoint {
    let mut best = candidates[0];
    let mut best_separation = target.flat_separation(&best);
    for candidate in &candidates[1..] {
        let separation = target.flat_separation(candidate);
        if separation < best_separation {
            best = *candidate;
            best_separation = separation;
        }
    }
    best
}
