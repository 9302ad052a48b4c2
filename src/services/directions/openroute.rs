use super::{DirectionsClient, DirectionsError};
use crate::constants::{
    OPENROUTESERVICE_BASE_URL, ORS_POINT_NOT_FOUND_CODE, ORS_REQUEST_LIMIT_CODE,
};
use crate::models::{AvoidFeature, GeoPoint, Path, RouteStep, RoutingOptions, Weightings};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenRouteService allows at most this many coordinates per request
const MAX_COORDINATES: usize = 50;

#[derive(Clone)]
pub struct OpenRouteServiceClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouteServiceClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, OPENROUTESERVICE_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        OpenRouteServiceClient {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, options: &RoutingOptions) -> String {
        format!("{}/{}/geojson", self.base_url, options.profile.profile())
    }
}

#[async_trait]
impl DirectionsClient for OpenRouteServiceClient {
    async fn request(
        &self,
        coordinates: &[GeoPoint],
        options: &RoutingOptions,
    ) -> Result<Path, DirectionsError> {
        if coordinates.len() < 2 {
            return Err(DirectionsError::InvalidRequest(
                "At least 2 coordinates required".to_string(),
            ));
        }
        if coordinates.len() > MAX_COORDINATES {
            return Err(DirectionsError::InvalidRequest(format!(
                "Maximum {} coordinates allowed",
                MAX_COORDINATES
            )));
        }

        let body = OrsDirectionsBody::new(coordinates, options);

        tracing::debug!(
            coordinates = coordinates.len(),
            profile = %options.profile,
            "ORS request: {} coordinates, profile {}",
            coordinates.len(),
            options.profile
        );

        let response = self
            .client
            .post(self.endpoint(options))
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DirectionsError::Transport(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                coordinates = coordinates.len(),
                "ORS HTTP error {}: {}",
                status,
                error_text
            );
            return Err(classify_error_body(status.as_u16(), &error_text));
        }

        let collection: OrsFeatureCollection = response
            .json()
            .await
            .map_err(|e| DirectionsError::Transport(format!("Failed to parse response: {}", e)))?;

        let path = collection.into_path()?;
        tracing::debug!(
            distance_km = %format!("{:.2}", path.distance_km()),
            path_points = path.len(),
            "ORS response: {:.2}km, {} path points",
            path.distance_km(),
            path.len()
        );
        Ok(path)
    }

    fn backend_name(&self) -> &'static str {
        "openrouteservice"
    }
}

// Request body

#[derive(Debug, Serialize)]
struct OrsDirectionsBody {
    coordinates: Vec<[f64; 2]>,
    instructions: bool,
    options: OrsOptions,
}

#[derive(Debug, Serialize)]
struct OrsOptions {
    avoid_features: Vec<AvoidFeature>,
    profile_params: OrsProfileParams,
}

#[derive(Debug, Serialize)]
struct OrsProfileParams {
    weightings: Weightings,
}

impl OrsDirectionsBody {
    fn new(coordinates: &[GeoPoint], options: &RoutingOptions) -> Self {
        OrsDirectionsBody {
            coordinates: coordinates.iter().map(|c| c.to_lng_lat()).collect(),
            instructions: true,
            options: OrsOptions {
                avoid_features: options.avoid_features.iter().copied().collect(),
                profile_params: OrsProfileParams {
                    weightings: options.weightings,
                },
            },
        }
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct OrsFeatureCollection {
    features: Vec<OrsFeature>,
}

#[derive(Debug, Deserialize)]
struct OrsFeature {
    geometry: OrsGeometry,
    #[serde(default)]
    properties: OrsProperties,
}

#[derive(Debug, Deserialize)]
struct OrsGeometry {
    /// `[lng, lat]` or `[lng, lat, elevation]`
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct OrsProperties {
    #[serde(default)]
    segments: Vec<OrsSegment>,
}

#[derive(Debug, Deserialize)]
struct OrsSegment {
    #[serde(default)]
    steps: Vec<OrsStep>,
}

#[derive(Debug, Deserialize)]
struct OrsStep {
    instruction: String,
    way_points: Vec<usize>,
}

impl OrsFeatureCollection {
    fn into_path(self) -> Result<Path, DirectionsError> {
        let feature = self
            .features
            .into_iter()
            .next()
            .ok_or(DirectionsError::NoRoute)?;

        let points: Vec<GeoPoint> = feature
            .geometry
            .coordinates
            .iter()
            .filter_map(|c| match c.as_slice() {
                [lng, lat, ..] => GeoPoint::from_lng_lat([*lng, *lat]).ok(),
                _ => None,
            })
            .collect();

        if points.is_empty() {
            return Err(DirectionsError::NoRoute);
        }

        let steps: Vec<RouteStep> = feature
            .properties
            .segments
            .into_iter()
            .flat_map(|segment| segment.steps)
            .filter_map(|step| {
                step.way_points.first().map(|&way_point| RouteStep {
                    way_point,
                    instruction: step.instruction,
                })
            })
            .collect();

        Ok(Path::from_route(&points, &steps))
    }
}

#[derive(Debug, Deserialize)]
struct OrsErrorEnvelope {
    error: OrsErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrsErrorBody {
    Detailed { code: i64, message: String },
    Plain(String),
}

/// Map an error response body onto a [`DirectionsError`].
fn classify_error_body(status: u16, body: &str) -> DirectionsError {
    match serde_json::from_str::<OrsErrorEnvelope>(body) {
        Ok(OrsErrorEnvelope {
            error: OrsErrorBody::Detailed { code, message },
        }) => classify_error(Some(code), &message),
        Ok(OrsErrorEnvelope {
            error: OrsErrorBody::Plain(message),
        }) => classify_error(None, &message),
        Err(_) => DirectionsError::Transport(format!("HTTP {}: {}", status, body)),
    }
}

fn classify_error(code: Option<i64>, message: &str) -> DirectionsError {
    let unroutable = code == Some(ORS_POINT_NOT_FOUND_CODE)
        || message.contains("Could not find routable point");
    if unroutable {
        return match parse_coordinate_index(message) {
            Some(index) => DirectionsError::UnroutablePoint {
                index,
                message: message.to_string(),
            },
            None => DirectionsError::Transport(message.to_string()),
        };
    }

    if code == Some(ORS_REQUEST_LIMIT_CODE) || message.contains("150000") {
        return DirectionsError::RouteTooLarge(message.to_string());
    }

    DirectionsError::Transport(message.to_string())
}

/// Extract `N` from "... coordinate N: lng lat ..."
fn parse_coordinate_index(message: &str) -> Option<usize> {
    let (_, rest) = message.split_once("coordinate ")?;
    rest.split(':').next()?.trim().parse().ok()
}
