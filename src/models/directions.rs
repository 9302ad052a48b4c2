use crate::models::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Routing profile understood by the directions provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TravelMode {
    #[default]
    #[serde(rename = "cycling-regular")]
    CyclingRegular,
    #[serde(rename = "cycling-road")]
    CyclingRoad,
    #[serde(rename = "cycling-mountain")]
    CyclingMountain,
    #[serde(rename = "cycling-electric")]
    CyclingElectric,
    #[serde(rename = "driving-car")]
    DrivingCar,
    #[serde(rename = "foot-walking")]
    FootWalking,
    #[serde(rename = "foot-hiking")]
    FootHiking,
}

impl TravelMode {
    /// Returns the OpenRouteService profile name for this mode
    pub fn profile(&self) -> &'static str {
        match self {
            TravelMode::CyclingRegular => "cycling-regular",
            TravelMode::CyclingRoad => "cycling-road",
            TravelMode::CyclingMountain => "cycling-mountain",
            TravelMode::CyclingElectric => "cycling-electric",
            TravelMode::DrivingCar => "driving-car",
            TravelMode::FootWalking => "foot-walking",
            TravelMode::FootHiking => "foot-hiking",
        }
    }

    pub fn is_driving(&self) -> bool {
        matches!(self, TravelMode::DrivingCar)
    }

    pub fn is_cycling(&self) -> bool {
        matches!(
            self,
            TravelMode::CyclingRegular
                | TravelMode::CyclingRoad
                | TravelMode::CyclingMountain
                | TravelMode::CyclingElectric
        )
    }

    pub fn is_foot(&self) -> bool {
        matches!(self, TravelMode::FootWalking | TravelMode::FootHiking)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cycling-regular" | "cycling" | "bike" => Ok(TravelMode::CyclingRegular),
            "cycling-road" => Ok(TravelMode::CyclingRoad),
            "cycling-mountain" => Ok(TravelMode::CyclingMountain),
            "cycling-electric" => Ok(TravelMode::CyclingElectric),
            "driving-car" | "driving" => Ok(TravelMode::DrivingCar),
            "foot-walking" | "walking" | "walk" => Ok(TravelMode::FootWalking),
            "foot-hiking" | "hiking" => Ok(TravelMode::FootHiking),
            _ => Err(format!("Invalid travel mode: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AvoidFeature {
    Tollways,
    Ferries,
    Highways,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Weightings {
    pub steepness_difficulty: f64,
    pub green: f64,
    pub quiet: f64,
}

/// Options forwarded verbatim with every directions call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingOptions {
    pub profile: TravelMode,
    pub avoid_features: BTreeSet<AvoidFeature>,
    pub weightings: Weightings,
}

/// A closed-loop directions query: start at `base`, pass through
/// `waypoints` in order, return to `base`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectionsRequest {
    pub base: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    pub mode: TravelMode,
    pub avoid_highways: bool,
    pub avoid_ferries: bool,
    pub fitness_level: f64,
    pub green_factor: f64,
    pub quiet_factor: f64,
}

impl DirectionsRequest {
    pub fn new(base: GeoPoint, waypoints: Vec<GeoPoint>, mode: TravelMode) -> Self {
        DirectionsRequest {
            base,
            waypoints,
            mode,
            avoid_highways: false,
            avoid_ferries: false,
            fitness_level: 1.0,
            green_factor: 0.0,
            quiet_factor: 0.0,
        }
    }

    /// Same request with a different waypoint set; every other option is kept.
    pub fn with_waypoints(&self, waypoints: Vec<GeoPoint>) -> Self {
        DirectionsRequest {
            waypoints,
            ..self.clone()
        }
    }

    /// `[base, waypoints..., base]`
    pub fn coordinates(&self) -> Vec<GeoPoint> {
        let mut coordinates = Vec::with_capacity(self.waypoints.len() + 2);
        coordinates.push(self.base);
        coordinates.extend_from_slice(&self.waypoints);
        coordinates.push(self.base);
        coordinates
    }

    pub fn routing_options(&self) -> RoutingOptions {
        let mut avoid_features = BTreeSet::new();
        if self.mode.is_driving() && self.avoid_highways {
            avoid_features.insert(AvoidFeature::Tollways);
            avoid_features.insert(AvoidFeature::Highways);
        }
        if (self.mode.is_driving() || self.mode.is_cycling() || self.mode.is_foot())
            && self.avoid_ferries
        {
            avoid_features.insert(AvoidFeature::Ferries);
        }

        RoutingOptions {
            profile: self.mode,
            avoid_features,
            weightings: Weightings {
                steepness_difficulty: self.fitness_level,
                green: self.green_factor,
                quiet: self.quiet_factor,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> GeoPoint {
        GeoPoint::new(42.3, -71.3).unwrap()
    }

    #[test]
    fn test_coordinates_close_the_loop() {
        let wps = vec![
            GeoPoint::new(42.0, -71.0).unwrap(),
            GeoPoint::new(42.2, -71.1).unwrap(),
        ];
        let request = DirectionsRequest::new(base(), wps.clone(), TravelMode::CyclingRegular);
        let coords = request.coordinates();
        assert_eq!(coords, vec![base(), wps[0], wps[1], base()]);
    }

    #[test]
    fn test_coordinates_without_waypoints() {
        let request = DirectionsRequest::new(base(), vec![], TravelMode::FootWalking);
        assert_eq!(request.coordinates(), vec![base(), base()]);
    }

    #[test]
    fn test_driving_avoid_features_and_weightings() {
        let mut request = DirectionsRequest::new(base(), vec![], TravelMode::DrivingCar);
        request.avoid_highways = true;
        request.fitness_level = 3.0;
        request.green_factor = 1.0;

        let options = request.routing_options();
        assert_eq!(
            options.avoid_features.iter().copied().collect::<Vec<_>>(),
            vec![AvoidFeature::Tollways, AvoidFeature::Highways]
        );
        assert_eq!(
            options.weightings,
            Weightings {
                steepness_difficulty: 3.0,
                green: 1.0,
                quiet: 0.0
            }
        );
    }

    #[test]
    fn test_highways_ignored_when_cycling() {
        let mut request = DirectionsRequest::new(base(), vec![], TravelMode::CyclingRoad);
        request.avoid_highways = true;
        request.avoid_ferries = true;
        let options = request.routing_options();
        assert_eq!(
            options.avoid_features.into_iter().collect::<Vec<_>>(),
            vec![AvoidFeature::Ferries]
        );
    }

    #[test]
    fn test_with_waypoints_preserves_options() {
        let mut request = DirectionsRequest::new(base(), vec![], TravelMode::FootHiking);
        request.quiet_factor = 0.7;
        let moved = request.with_waypoints(vec![GeoPoint::new(42.31, -71.29).unwrap()]);
        assert_eq!(moved.waypoints.len(), 1);
        assert_eq!(moved.routing_options(), request.routing_options());
    }

    #[test]
    fn test_travel_mode_round_trip() {
        assert_eq!(
            "driving-car".parse::<TravelMode>().unwrap(),
            TravelMode::DrivingCar
        );
        assert_eq!(TravelMode::FootWalking.to_string(), "foot-walking");
        assert!("hovercraft".parse::<TravelMode>().is_err());
    }
}
