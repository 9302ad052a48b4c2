use crate::models::GeoPoint;
use crate::services::geo_math;
use serde::{Deserialize, Serialize};

/// A maneuver reported by the directions provider, anchored at an index of
/// the raw (not yet de-duplicated) route geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    pub way_point: usize,
    pub instruction: String,
}

/// A point on a routed path, annotated with distance and turn information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub lat: f64,
    pub lng: f64,
    pub cumulative_distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_to_next_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_instruction_at: Option<usize>,
}

impl PathPoint {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Ordered route geometry. Cumulative distances always start at 0 and never
/// decrease; adjacent duplicates are removed on construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    /// Build a path from plain coordinates with no maneuvers attached.
    pub fn from_points(points: &[GeoPoint]) -> Self {
        Self::from_route(points, &[])
    }

    /// Build a path from a directions response.
    ///
    /// Instructions are attached by raw geometry index before duplicates are
    /// collapsed, so a step pointing at a dropped duplicate moves onto the
    /// surviving copy.
    pub fn from_route(points: &[GeoPoint], steps: &[RouteStep]) -> Self {
        let mut instructions: Vec<Option<String>> = vec![None; points.len()];
        for step in steps {
            match instructions.get_mut(step.way_point) {
                Some(slot) => *slot = Some(step.instruction.clone()),
                None => tracing::debug!(
                    way_point = step.way_point,
                    points = points.len(),
                    "Ignoring maneuver beyond end of geometry"
                ),
            }
        }

        let mut kept: Vec<(GeoPoint, Option<String>)> = Vec::with_capacity(points.len());
        for (point, instruction) in points.iter().zip(instructions) {
            match kept.last_mut() {
                Some((last, last_instruction)) if last == point => {
                    if last_instruction.is_none() {
                        *last_instruction = instruction;
                    }
                }
                _ => kept.push((*point, instruction)),
            }
        }

        let locations: Vec<GeoPoint> = kept.iter().map(|(p, _)| *p).collect();
        let cumulative = geo_math::cumulative_distances_km(&locations);

        let mut path_points: Vec<PathPoint> = kept
            .into_iter()
            .zip(cumulative)
            .map(|((p, instructions), cumulative_distance_km)| PathPoint {
                lat: p.lat,
                lng: p.lng,
                cumulative_distance_km,
                instructions,
                distance_to_next_km: None,
                next_instruction_at: None,
            })
            .collect();

        annotate_distance_to_next(&mut path_points);

        Path {
            points: path_points,
        }
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length, read from the last cumulative distance
    pub fn distance_km(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.cumulative_distance_km)
            .unwrap_or(0.0)
    }

    pub fn locations(&self) -> Vec<GeoPoint> {
        self.points.iter().map(PathPoint::location).collect()
    }
}

/// For every point carrying an instruction, record the distance and index of
/// the next instructed point (or the path end when none follows).
fn annotate_distance_to_next(points: &mut [PathPoint]) {
    let mut a = 0;
    while a < points.len() {
        if points[a].instructions.is_none() {
            a += 1;
            continue;
        }

        let mut b = a + 1;
        while b < points.len() && points[b].instructions.is_none() {
            b += 1;
        }

        let end = b.min(points.len() - 1);
        points[a].distance_to_next_km =
            Some(points[end].cumulative_distance_km - points[a].cumulative_distance_km);
        points[a].next_instruction_at = Some(b);
        a = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn step(way_point: usize, instruction: &str) -> RouteStep {
        RouteStep {
            way_point,
            instruction: instruction.to_string(),
        }
    }

    #[test]
    fn test_adjacent_duplicates_removed() {
        let path = Path::from_points(&[p(0.0, 0.0), p(0.0, 0.0), p(0.01, 0.0), p(0.0, 0.0)]);
        assert_eq!(path.len(), 3);
        // Non-adjacent repeats survive (loop closes on its start)
        assert_eq!(path.points()[0].location(), path.points()[2].location());
    }

    #[test]
    fn test_cumulative_distance_invariant() {
        let coords = vec![p(0.0, 0.0), p(0.01, 0.0), p(0.02, 0.005), p(0.03, 0.0)];
        let path = Path::from_points(&coords);
        assert_eq!(path.points()[0].cumulative_distance_km, 0.0);
        assert!(path
            .points()
            .windows(2)
            .all(|w| w[1].cumulative_distance_km >= w[0].cumulative_distance_km));
        assert!((path.distance_km() - geo_math::polyline_length_km(&coords)).abs() < 1e-12);
    }

    #[test]
    fn test_instructions_and_distance_to_next() {
        let coords = vec![p(0.0, 0.0), p(0.01, 0.0), p(0.02, 0.0), p(0.03, 0.0)];
        let path = Path::from_route(&coords, &[step(0, "Head north"), step(2, "Keep left")]);
        let points = path.points();

        assert_eq!(points[0].instructions.as_deref(), Some("Head north"));
        assert_eq!(points[0].next_instruction_at, Some(2));
        let expected = points[2].cumulative_distance_km;
        assert!((points[0].distance_to_next_km.unwrap() - expected).abs() < 1e-12);

        // Last instruction runs to the end of the path
        assert_eq!(points[2].next_instruction_at, Some(4));
        let tail = points[3].cumulative_distance_km - points[2].cumulative_distance_km;
        assert!((points[2].distance_to_next_km.unwrap() - tail).abs() < 1e-12);

        assert!(points[1].instructions.is_none());
        assert!(points[1].distance_to_next_km.is_none());
    }

    #[test]
    fn test_instruction_on_dropped_duplicate_moves_to_kept_point() {
        let coords = vec![p(0.0, 0.0), p(0.01, 0.0), p(0.01, 0.0), p(0.02, 0.0)];
        let path = Path::from_route(&coords, &[step(2, "Turn right")]);
        assert_eq!(path.len(), 3);
        assert_eq!(path.points()[1].instructions.as_deref(), Some("Turn right"));
    }

    #[test]
    fn test_out_of_range_step_ignored() {
        let path = Path::from_route(&[p(0.0, 0.0), p(0.01, 0.0)], &[step(9, "Arrive")]);
        assert!(path.points().iter().all(|pt| pt.instructions.is_none()));
    }

    #[test]
    fn test_empty_path() {
        let path = Path::from_points(&[]);
        assert!(path.is_empty());
        assert_eq!(path.distance_km(), 0.0);
    }

    #[test]
    fn test_serializes_as_array_of_points() {
        let path = Path::from_route(&[p(1.0, 2.0)], &[step(0, "Go")]);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json[0]["lat"], 1.0);
        assert_eq!(json[0]["cumulativeDistanceKm"], 0.0);
        assert_eq!(json[0]["instructions"], "Go");
    }
}
