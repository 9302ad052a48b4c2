//! Pruning of short out-and-back detours ("tails") from a routed loop.
//!
//! For every point the closest *later* point is found by exhaustive search.
//! When that point is not the immediate successor, the path wanders off and
//! comes back near itself; if the enclosed stretch is a small fraction of the
//! whole loop, the points in between are dropped.
//!
//! Route geometries are a few hundred points, so the O(n²) scan is cheap and
//! keeps tie-breaking trivial (first minimum wins).

use crate::constants::DEFAULT_TAIL_FRACTION_THRESHOLD;
use crate::models::GeoPoint;
use crate::services::geo_math;

/// Result of one cleaning pass
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedPath {
    pub path: Vec<GeoPoint>,
    pub removed_count: usize,
    pub total_distance_km: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TailCleaner {
    threshold: f64,
}

impl Default for TailCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_TAIL_FRACTION_THRESHOLD)
    }
}

impl TailCleaner {
    /// `threshold` is the enclosed fraction of total length below which a
    /// detour is removed.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn clean(&self, points: &[GeoPoint]) -> CleanedPath {
        if points.len() < 2 {
            return CleanedPath {
                path: points.to_vec(),
                removed_count: 0,
                total_distance_km: 0.0,
            };
        }

        let cumulative = geo_math::cumulative_distances_km(points);
        let total = cumulative.last().copied().unwrap_or(0.0);
        let closest = closest_forward_points(points);
        let keep = keep_mask(&cumulative, total, &closest, self.threshold);

        let path: Vec<GeoPoint> = points
            .iter()
            .zip(&keep)
            .filter(|(_, &kept)| kept)
            .map(|(p, _)| *p)
            .collect();

        let removed_count = points.len() - path.len();
        let total_distance_km = geo_math::polyline_length_km(&path);

        tracing::debug!(
            removed = removed_count,
            input_points = points.len(),
            distance_km = %format!("{:.2}", total_distance_km),
            "Tail cleaning trimmed {} of {} points, {:.2}km remaining",
            removed_count,
            points.len(),
            total_distance_km
        );

        CleanedPath {
            path,
            removed_count,
            total_distance_km,
        }
    }
}

/// For each index `i`, the index `j > i` of the point nearest to `points[i]`.
/// The last point has no successor.
pub fn closest_forward_points(points: &[GeoPoint]) -> Vec<Option<usize>> {
    (0..points.len())
        .map(|i| {
            let mut best: Option<(usize, f64)> = None;
            for j in (i + 1)..points.len() {
                let d = geo_math::distance_km(&points[i], &points[j]);
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((j, d));
                }
            }
            best.map(|(j, _)| j)
        })
        .collect()
}

/// Decide which points survive.
///
/// Walks forward from index 0; whenever the closest later point `j` is not
/// `i + 1` and the stretch `i..j` covers less than `threshold` of `total`,
/// everything strictly between `i` and `j` is dropped and the walk resumes at
/// `j`. The first and last points are always kept.
pub fn keep_mask(
    cumulative: &[f64],
    total: f64,
    closest: &[Option<usize>],
    threshold: f64,
) -> Vec<bool> {
    let n = closest.len();
    let mut keep = vec![true; n];
    let divisor = if total == 0.0 { 1.0 } else { total };

    let mut i = 0;
    while i < n {
        match closest[i] {
            Some(j) if j != i + 1 => {
                let tail_fraction = (cumulative[j] - cumulative[i]) / divisor;
                if tail_fraction < threshold {
                    keep[(i + 1)..j].iter_mut().for_each(|k| *k = false);
                    i = j;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if n > 0 {
        keep[0] = true;
        keep[n - 1] = true;
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn test_short_paths_unchanged() {
        let cleaner = TailCleaner::default();
        let empty = cleaner.clean(&[]);
        assert_eq!(empty.removed_count, 0);
        assert!(empty.path.is_empty());

        let single = cleaner.clean(&[p(0.0, 0.0)]);
        assert_eq!(single.removed_count, 0);
        assert_eq!(single.path, vec![p(0.0, 0.0)]);
    }

    #[test]
    fn test_straight_route_untouched() {
        let straight = vec![p(0.0, 0.0), p(0.01, 0.0), p(0.02, 0.0), p(0.03, 0.0)];
        let result = TailCleaner::default().clean(&straight);
        assert_eq!(result.removed_count, 0);
        assert_eq!(result.path.len(), 4);
    }

    #[test]
    fn test_closest_forward_first_minimum_wins() {
        // Points 1 and 2 are both exactly 0.01° north of point 0
        let points = vec![p(0.0, 0.0), p(0.01, 0.0), p(0.01, 0.0), p(0.05, 0.0)];
        let closest = closest_forward_points(&points);
        assert_eq!(closest, vec![Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn test_keep_mask_threshold_boundary() {
        // closest[1] = 3 encloses (3 - 1) / 10 = 0.2 of the path: kept
        let cumulative = [0.0, 1.0, 2.0, 3.0, 10.0];
        let closest = [Some(1), Some(3), Some(3), Some(4), None];
        let keep = keep_mask(&cumulative, 10.0, &closest, 0.2);
        assert_eq!(keep, vec![true; 5]);

        // Just under the threshold: removed
        let cumulative = [0.0, 1.0, 2.0, 2.99, 10.0];
        let keep = keep_mask(&cumulative, 10.0, &closest, 0.2);
        assert_eq!(keep, vec![true, true, false, true, true]);
    }

    #[test]
    fn test_keep_mask_jumps_to_closest() {
        // After pruning 1..4 the walk resumes at 4, so closest[2] is never consulted
        let cumulative = [0.0, 1.0, 2.0, 3.0, 4.0, 50.0];
        let closest = [Some(4), Some(2), Some(5), Some(4), Some(5), None];
        let keep = keep_mask(&cumulative, 50.0, &closest, 0.2);
        assert_eq!(keep, vec![true, false, false, false, true, true]);
    }

    #[test]
    fn test_keep_mask_zero_length_path() {
        let cumulative = [0.0, 0.0, 0.0];
        let closest = [Some(2), Some(2), None];
        // Divisor falls back to 1, fraction 0 < 0.2
        let keep = keep_mask(&cumulative, 0.0, &closest, 0.2);
        assert_eq!(keep, vec![true, false, true]);
    }

    #[test]
    fn test_endpoints_always_kept() {
        // The final point is nearest to the start, but the whole loop is
        // enclosed, so nothing goes; endpoints survive regardless
        let loop_path = vec![p(0.0, 0.0), p(0.01, 0.0), p(0.01, 0.01), p(0.0, 0.01), p(0.0, 0.0)];
        let result = TailCleaner::default().clean(&loop_path);
        assert_eq!(result.path.first(), loop_path.first());
        assert_eq!(result.path.last(), loop_path.last());
        assert_eq!(result.removed_count, 0);
    }

    #[test]
    fn test_removes_small_detour() {
        let route = vec![
            p(0.0, 0.0),
            p(0.02, 0.0),
            p(0.04, 0.0),
            p(0.0401, 0.0001),
            p(0.0402, 0.0001),
            p(0.04000001, 0.0),
            p(0.08, 0.0),
            p(0.12, 0.0),
        ];
        let result = TailCleaner::default().clean(&route);

        assert_eq!(result.removed_count, 2);
        assert_eq!(
            result.path,
            vec![
                p(0.0, 0.0),
                p(0.02, 0.0),
                p(0.04, 0.0),
                p(0.04000001, 0.0),
                p(0.08, 0.0),
                p(0.12, 0.0)
            ]
        );
        assert!(result.total_distance_km < geo_math::polyline_length_km(&route));
        assert!((result.total_distance_km - geo_math::polyline_length_km(&result.path)).abs() < 1e-12);
    }

    #[test]
    fn test_keeps_large_detour() {
        let route = vec![
            p(0.0, 0.0),
            p(0.01, 0.0),
            p(0.01, 0.05),
            p(0.0, 0.05),
            p(0.01, 0.0),
            p(0.02, 0.0),
        ];
        let result = TailCleaner::default().clean(&route);
        assert_eq!(result.removed_count, 0);
        assert_eq!(result.path.len(), route.len());
    }

    #[test]
    fn test_second_pass_is_noop() {
        let route = vec![
            p(0.0, 0.0),
            p(0.02, 0.0),
            p(0.04, 0.0),
            p(0.0401, 0.0001),
            p(0.0402, 0.0001),
            p(0.04000001, 0.0),
            p(0.08, 0.0),
            p(0.12, 0.0),
        ];
        let cleaner = TailCleaner::default();
        let first = cleaner.clean(&route);
        let second = cleaner.clean(&first.path);
        assert_eq!(second.removed_count, 0);
        assert_eq!(second.path, first.path);
    }

    #[test]
    fn test_custom_threshold() {
        let route = vec![
            p(0.0, 0.0),
            p(0.01, 0.0),
            p(0.01, 0.05),
            p(0.0, 0.05),
            p(0.01, 0.0),
            p(0.02, 0.0),
        ];
        // The detour is ~85% of the loop; a permissive threshold prunes it
        let result = TailCleaner::new(0.9).clean(&route);
        assert_eq!(result.removed_count, 2);
        assert_eq!(result.path, vec![p(0.0, 0.0), p(0.01, 0.0), p(0.01, 0.0), p(0.02, 0.0)]);
    }
}
