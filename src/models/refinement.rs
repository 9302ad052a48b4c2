use crate::models::{GeoPoint, Path};
use serde::{Deserialize, Serialize};

/// Progress record emitted once per refinement round.
///
/// Iteration 0 is the unrefined route; the event with `keep_going == false`
/// is the last one of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefinementEvent {
    pub iteration: u32,
    pub distance_km: f64,
    pub cleaned_count: usize,
    pub total_points: usize,
    pub waypoints: Vec<GeoPoint>,
    pub path: Path,
    pub keep_going: bool,
}

/// Counts recorded after each round, used only to spot a stalled loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundCounts {
    pub cleaned_count: usize,
    pub total_points: usize,
}
