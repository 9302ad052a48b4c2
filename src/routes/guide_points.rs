use crate::constants::METERS_PER_KILOMETER;
use crate::error::{AppError, Result};
use crate::models::{GeoPoint, LoopSpec, Rotation, Shape};
use crate::services::guide_points;
use axum::{extract::Query, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GuidePointsQuery {
    pub lat: f64,
    pub lng: f64,
    /// Loop length in kilometers
    #[serde(alias = "dist")]
    pub dist_km: f64,
    /// 0 for random, 1..=8 for N, NE, E, SE, S, SW, W, NW
    pub direction: Option<u8>,
    pub method: Option<String>,
    pub rotation: Option<String>,
}

impl GuidePointsQuery {
    fn into_loop_spec(self) -> Result<LoopSpec> {
        let base = GeoPoint::new(self.lat, self.lng).map_err(AppError::InvalidArgument)?;
        let shape = match self.method.as_deref() {
            Some(method) => method.parse::<Shape>().map_err(AppError::InvalidArgument)?,
            None => Shape::default(),
        };
        let rotation = match self.rotation.as_deref() {
            Some(rotation) => rotation
                .parse::<Rotation>()
                .map_err(AppError::InvalidArgument)?,
            None => Rotation::default(),
        };

        Ok(LoopSpec {
            base,
            length_m: self.dist_km * METERS_PER_KILOMETER,
            heading: self.direction,
            rotation,
            shape,
        })
    }
}

/// GET /guide-points
/// Propose the initial waypoints for a loop of `dist_km` around (lat, lng)
pub async fn generate_guide_points(
    Query(query): Query<GuidePointsQuery>,
) -> Result<Json<Vec<GeoPoint>>> {
    let spec = query.into_loop_spec()?;

    tracing::info!(
        lat = spec.base.lat,
        lng = spec.base.lng,
        length_m = spec.length_m,
        shape = %spec.shape,
        "Guide points request: ({:.4}, {:.4}), {:.0}m, method={}",
        spec.base.lat,
        spec.base.lng,
        spec.length_m,
        spec.shape
    );

    let points = guide_points::generate(&spec, &mut rand::rng())?;
    Ok(Json(points))
}
