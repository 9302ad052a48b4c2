use crate::error::{AppError, Result};
use crate::models::{DirectionsRequest, GeoPoint, RefinementEvent, TravelMode};
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use futures::stream::{self, BoxStream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineQuery {
    pub lat: f64,
    pub lng: f64,
    /// `lat,lng|lat,lng|...`
    pub waypoints: Option<String>,
    pub mode: Option<String>,
    pub highways: Option<String>,
    pub ferries: Option<String>,
    pub fitness_level: Option<f64>,
    pub green_factor: Option<f64>,
    pub quiet_factor: Option<f64>,
}

fn flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("yes" | "true" | "1")
    )
}

pub fn parse_waypoints(text: &str) -> Result<Vec<GeoPoint>> {
    text.split('|')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| GeoPoint::parse_lat_lng(pair).map_err(AppError::InvalidArgument))
        .collect()
}

impl RefineQuery {
    pub fn into_request(self) -> Result<DirectionsRequest> {
        let base = GeoPoint::new(self.lat, self.lng).map_err(AppError::InvalidArgument)?;
        let waypoints = match self.waypoints.as_deref() {
            Some(text) => parse_waypoints(text)?,
            None => Vec::new(),
        };
        let mode = match self.mode.as_deref() {
            Some(mode) => mode.parse::<TravelMode>().map_err(AppError::InvalidArgument)?,
            None => TravelMode::default(),
        };

        let mut request = DirectionsRequest::new(base, waypoints, mode);
        request.avoid_highways = flag(self.highways.as_deref());
        request.avoid_ferries = flag(self.ferries.as_deref());
        if let Some(fitness) = self.fitness_level {
            request.fitness_level = fitness;
        }
        if let Some(green) = self.green_factor {
            request.green_factor = green;
        }
        if let Some(quiet) = self.quiet_factor {
            request.quiet_factor = quiet;
        }
        Ok(request)
    }
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(json!({ "message": message }).to_string())
}

fn to_sse_event(item: Result<RefinementEvent>) -> Event {
    match item {
        Ok(event) => {
            let name = if event.iteration == 0 {
                "start"
            } else {
                "refinement"
            };
            Event::default()
                .event(name)
                .json_data(&event)
                .unwrap_or_else(|e| {
                    let err = AppError::Internal(format!(
                        "Failed to serialize refinement event: {}",
                        e
                    ));
                    tracing::error!("{}", err);
                    error_event(&err.user_message())
                })
        }
        Err(e) => {
            tracing::warn!("Refinement session ended with error: {}", e);
            error_event(&e.user_message())
        }
    }
}

/// GET /routes/refine
/// Route a loop through the given waypoints and stream each refinement round
/// as a server-sent event
pub async fn refine_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RefineQuery>,
) -> Result<Sse<KeepAliveStream<BoxStream<'static, std::result::Result<Event, Infallible>>>>> {
    let request = query.into_request()?;

    tracing::info!(
        lat = request.base.lat,
        lng = request.base.lng,
        waypoints = request.waypoints.len(),
        mode = %request.mode,
        "Refine request: ({:.4}, {:.4}), {} waypoints, mode={}",
        request.base.lat,
        request.base.lng,
        request.waypoints.len(),
        request.mode
    );

    let events = state
        .improvement_cycle()
        .session(request)
        .map(|item| Ok::<_, Infallible>(to_sse_event(item)))
        .chain(stream::once(async {
            Ok::<_, Infallible>(Event::default().event("end").data("done"))
        }))
        .boxed();

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> RefineQuery {
        RefineQuery {
            lat: 42.3,
            lng: -71.3,
            waypoints: Some("42.31,-71.29|42.29,-71.31".to_string()),
            mode: Some("driving-car".to_string()),
            highways: Some("yes".to_string()),
            ferries: None,
            fitness_level: Some(2.0),
            green_factor: None,
            quiet_factor: Some(0.5),
        }
    }

    #[test]
    fn test_query_to_request() {
        let request = query().into_request().unwrap();
        assert_eq!(request.waypoints.len(), 2);
        assert_eq!(request.mode, TravelMode::DrivingCar);
        assert!(request.avoid_highways);
        assert!(!request.avoid_ferries);
        assert_eq!(request.fitness_level, 2.0);
        assert_eq!(request.green_factor, 0.0);
        assert_eq!(request.quiet_factor, 0.5);
    }

    #[test]
    fn test_malformed_waypoint_rejected() {
        let mut q = query();
        q.waypoints = Some("42.31,-71.29|banana".to_string());
        assert!(matches!(
            q.into_request(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_waypoint_list() {
        assert!(parse_waypoints("").unwrap().is_empty());
        assert_eq!(parse_waypoints("1,2|").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mut q = query();
        q.mode = Some("teleport".to_string());
        assert!(q.into_request().is_err());
    }

    #[test]
    fn test_flag_values() {
        assert!(flag(Some("yes")));
        assert!(flag(Some("TRUE")));
        assert!(!flag(Some("no")));
        assert!(!flag(None));
    }
}
