//! Stable application-wide constants.
//!
//! Values here are geometric constants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. For knobs that are worth
//! tuning at runtime, see [`RefinementConfig`](crate::config::RefinementConfig).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Earth model ---

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Meters per degree of latitude for the local tangent-plane offset.
pub const METERS_PER_DEGREE_LAT: f64 = 110_540.0;
/// Meters per degree of longitude at the equator, scaled by cos(lat).
pub const METERS_PER_DEGREE_LNG_EQUATOR: f64 = 111_320.0;
pub const METERS_PER_KILOMETER: f64 = 1000.0;

// --- Guide point geometry ---

/// Points placed around the ring for the circular shape.
pub const CIRCLE_POINTS: usize = 4;
/// Points per lobe for the figure-eight shape.
pub const FIGURE8_CIRCLE_POINTS: usize = 3;
/// Largest height:width ratio of the rectangular shape; the smallest is its inverse.
pub const RECT_MAX_RATIO: f64 = 5.0;
/// Angular width of each heading sector (radians).
pub const HEADING_SECTOR_WIDTH_RAD: f64 = std::f64::consts::FRAC_PI_4;

// --- Refinement ---

/// A detour is pruned only when it encloses strictly less than this fraction
/// of the total path length.
pub const DEFAULT_TAIL_FRACTION_THRESHOLD: f64 = 0.2;
/// Safety ceiling on refinement rounds per session.
pub const DEFAULT_MAX_REFINEMENT_ROUNDS: u32 = 50;

// --- Directions provider ---

pub const OPENROUTESERVICE_BASE_URL: &str = "https://api.openrouteservice.org/v2/directions";
/// OpenRouteService error code: a coordinate could not be snapped to the network.
pub const ORS_POINT_NOT_FOUND_CODE: i64 = 2010;
/// OpenRouteService error code: request exceeds a server limit (route length).
pub const ORS_REQUEST_LIMIT_CODE: i64 = 2004;

// --- Directions cache defaults ---

/// Default TTL for cached directions responses: 1 hour.
pub const DEFAULT_DIRECTIONS_CACHE_TTL_SECONDS: u64 = 3_600;
/// Default maximum number of cached directions responses.
pub const DEFAULT_DIRECTIONS_CACHE_MAX_ENTRIES: u64 = 1_000;
/// Coordinates are rounded to this many decimals when building cache keys (~0.1 m).
pub const CACHE_KEY_COORDINATE_DECIMALS: i32 = 6;
