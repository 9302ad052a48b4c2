use async_trait::async_trait;
use loopsmith::config::RefinementConfig;
use loopsmith::models::{GeoPoint, Path, RoutingOptions};
use loopsmith::services::directions::{DirectionsClient, DirectionsError};
use loopsmith::AppState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[allow(dead_code)]
pub fn p(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng).unwrap()
}

/// Straight-line interpolation with `per_segment` steps between each pair
#[allow(dead_code)]
pub fn densify(coordinates: &[GeoPoint], per_segment: usize) -> Vec<GeoPoint> {
    let mut points = Vec::new();
    for pair in coordinates.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for k in 0..per_segment {
            let t = k as f64 / per_segment as f64;
            points.push(p(a.lat + (b.lat - a.lat) * t, a.lng + (b.lng - a.lng) * t));
        }
    }
    if let Some(last) = coordinates.last() {
        points.push(*last);
    }
    points
}

/// ~1.1km square loop north-east of the origin, as (base, waypoints)
#[allow(dead_code)]
pub fn square_loop() -> (GeoPoint, Vec<GeoPoint>) {
    (p(0.0, 0.0), vec![p(0.01, 0.0), p(0.01, 0.01), p(0.0, 0.01)])
}

/// The square loop with a ~0.45km out-and-back spur at the first waypoint,
/// about 9% of the total length. Tail cleaning removes exactly
/// [`SPUR_POINTS`] points from it.
#[allow(dead_code)]
pub fn square_with_spur() -> Vec<GeoPoint> {
    let (base, waypoints) = square_loop();
    let mut coordinates = vec![base];
    coordinates.extend(waypoints);
    coordinates.push(base);

    let mut points = densify(&coordinates, 10);
    // Index 10 is the first waypoint
    let spur = [
        p(0.01, -0.001),
        p(0.01, -0.002),
        p(0.01, -0.0011),
        p(0.01, 0.00001),
    ];
    for (offset, point) in spur.iter().enumerate() {
        points.insert(11 + offset, *point);
    }
    points
}

#[allow(dead_code)]
pub const SPUR_POINTS: usize = 3;

/// Directions double: replays scripted responses in order, then falls back to
/// densified straight lines through the requested coordinates.
pub struct MockDirections {
    responses: Mutex<VecDeque<Result<Path, DirectionsError>>>,
    calls: Mutex<Vec<Vec<GeoPoint>>>,
}

#[allow(dead_code)]
impl MockDirections {
    pub fn echo() -> Arc<Self> {
        Self::scripted(vec![])
    }

    pub fn scripted(responses: Vec<Result<Path, DirectionsError>>) -> Arc<Self> {
        Arc::new(MockDirections {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<GeoPoint>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectionsClient for MockDirections {
    async fn request(
        &self,
        coordinates: &[GeoPoint],
        _options: &RoutingOptions,
    ) -> Result<Path, DirectionsError> {
        self.calls.lock().unwrap().push(coordinates.to_vec());
        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => Ok(Path::from_points(&densify(coordinates, 10))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

/// Router under `/api/v1`-relative paths, backed by `directions`
#[allow(dead_code)]
pub fn test_app(directions: Arc<dyn DirectionsClient>) -> axum::Router {
    let state = Arc::new(AppState::new(directions, RefinementConfig::default()));
    loopsmith::routes::create_router(state)
}
