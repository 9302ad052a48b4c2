//! Initial guide point layouts around a base location.
//!
//! Every layout is described in a flat local tangent plane around the base
//! (see [`geo_math::offset_point`]); the directions provider is responsible
//! for turning the points into an actual road loop. The base itself is never
//! part of the output: callers close the loop by routing from and back to it.

use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{GeoPoint, LoopSpec, Rotation, Shape};
use crate::services::geo_math::offset_point;
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Angular range a heading selects, in radians counterclockwise from east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSector {
    pub center: f64,
    pub half_width: f64,
}

impl HeadingSector {
    /// Map a uniform draw in `[0, 1)` onto the sector.
    pub fn angle_at(&self, unit: f64) -> f64 {
        self.center - self.half_width + unit * 2.0 * self.half_width
    }
}

/// Sector for a user-facing heading.
///
/// `None` and `0` cover the full circle. `1..=8` are 45° sectors:
/// 1 N, 2 NE, 3 E, 4 SE, 5 S, 6 SW, 7 W, 8 NW.
pub fn sector_angle(heading: Option<u8>) -> Result<HeadingSector> {
    let half_width = HEADING_SECTOR_WIDTH_RAD / 2.0;
    let center = match heading.unwrap_or(0) {
        0 => {
            return Ok(HeadingSector {
                center: PI,
                half_width: PI,
            })
        }
        1 => 4.0 * PI / 8.0,
        2 => 2.0 * PI / 8.0,
        3 => 0.0,
        4 => 14.0 * PI / 8.0,
        5 => 12.0 * PI / 8.0,
        6 => 10.0 * PI / 8.0,
        7 => 8.0 * PI / 8.0,
        8 => 6.0 * PI / 8.0,
        other => {
            return Err(AppError::InvalidArgument(format!(
                "heading must be between 0 and 8, got {}",
                other
            )))
        }
    };
    Ok(HeadingSector { center, half_width })
}

fn unit_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardUniform.sample(rng)
}

/// Pick one of the three concrete shapes with equal probability.
/// Concrete shapes are returned unchanged.
pub fn resolve_shape<R: Rng + ?Sized>(shape: Shape, rng: &mut R) -> Shape {
    if shape != Shape::Random {
        return shape;
    }
    let index = (unit_draw(rng) * Shape::CONCRETE.len() as f64) as usize;
    Shape::CONCRETE[index.min(Shape::CONCRETE.len() - 1)]
}

/// Generate the guide points for `spec`.
///
/// Circular yields 4 points, rectangular 3 and figure-eight 6.
pub fn generate<R: Rng + ?Sized>(spec: &LoopSpec, rng: &mut R) -> Result<Vec<GeoPoint>> {
    let base = GeoPoint::new(spec.base.lat, spec.base.lng).map_err(AppError::InvalidArgument)?;
    if !spec.length_m.is_finite() || spec.length_m <= 0.0 {
        return Err(AppError::InvalidArgument(format!(
            "loop length must be a positive number of meters, got {}",
            spec.length_m
        )));
    }

    let sector = sector_angle(spec.heading)?;
    let shape = resolve_shape(spec.shape, rng);

    let points = match shape {
        Shape::Circular => {
            let direction = sector.angle_at(unit_draw(rng));
            circle_route(&base, spec.length_m, direction, spec.rotation)
        }
        Shape::Rectangular => {
            let ratio = unit_draw(rng) * (RECT_MAX_RATIO - 1.0 / RECT_MAX_RATIO)
                + 1.0 / RECT_MAX_RATIO;
            let direction = sector.angle_at(unit_draw(rng));
            rectangle_route(&base, spec.length_m, direction, spec.rotation, ratio)
        }
        // resolve_shape never returns Random
        Shape::Figure8 | Shape::Random => {
            let direction = sector.angle_at(unit_draw(rng));
            figure8_route(&base, spec.length_m, direction, spec.rotation)
        }
    };

    tracing::debug!(
        shape = %shape,
        points = points.len(),
        length_m = spec.length_m,
        "Generated {} guide points for a {} loop of {:.0}m",
        points.len(),
        shape,
        spec.length_m
    );

    Ok(points)
}

/// Points on a circle of `radius_m` whose center lies `radius_m` from
/// `location` along `direction`, so the circle passes through `location`.
///
/// The ring is split into `count + 1` arcs starting from the angle pointing
/// back at `location`; `location` itself is the omitted closing point.
fn ring_points(
    location: &GeoPoint,
    direction: f64,
    radius_m: f64,
    rotation: Rotation,
    count: usize,
) -> Vec<GeoPoint> {
    let center = offset_point(location, direction, radius_m);
    let start_angle = direction + PI;
    let step = rotation.sign() * TAU / (count + 1) as f64;

    (1..=count)
        .map(|i| offset_point(&center, start_angle + step * i as f64, radius_m))
        .collect()
}

/// Circular layout: perimeter of the ring approximates `length_m`.
pub fn circle_route(
    base: &GeoPoint,
    length_m: f64,
    direction: f64,
    rotation: Rotation,
) -> Vec<GeoPoint> {
    ring_points(base, direction, length_m / TAU, rotation, CIRCLE_POINTS)
}

/// Rectangular layout with `base` as the implicit fourth corner.
/// `ratio` is height:width.
pub fn rectangle_route(
    base: &GeoPoint,
    length_m: f64,
    direction: f64,
    rotation: Rotation,
    ratio: f64,
) -> Vec<GeoPoint> {
    let width = length_m / (2.0 * ratio + 2.0);
    let height = width * ratio;
    let diagonal = width.hypot(height);
    let theta = (height / diagonal).acos();
    let sign = rotation.sign();

    vec![
        offset_point(base, direction, height),
        offset_point(base, sign * theta + direction, diagonal),
        offset_point(base, sign * PI / 2.0 + direction, width),
    ]
}

/// Two half-length lobes crossing at `base`, traversed in opposite senses.
pub fn figure8_route(
    base: &GeoPoint,
    length_m: f64,
    direction: f64,
    rotation: Rotation,
) -> Vec<GeoPoint> {
    let radius = length_m / (2.0 * TAU);
    let mut points = ring_points(base, direction, radius, rotation, FIGURE8_CIRCLE_POINTS);
    points.extend(ring_points(
        base,
        direction + PI,
        radius,
        rotation.reversed(),
        FIGURE8_CIRCLE_POINTS,
    ));
    points
}
