use crate::models::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction in which the loop is traversed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Clockwise,
    Counterclockwise,
}

impl Rotation {
    /// Angular sign: clockwise turns negative in the east-counterclockwise frame
    pub fn sign(self) -> f64 {
        match self {
            Rotation::Clockwise => -1.0,
            Rotation::Counterclockwise => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::Counterclockwise,
            Rotation::Counterclockwise => Rotation::Clockwise,
        }
    }
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clockwise" | "cw" => Ok(Rotation::Clockwise),
            "counterclockwise" | "anticlockwise" | "ccw" => Ok(Rotation::Counterclockwise),
            _ => Err(format!("Invalid rotation: '{}'", s)),
        }
    }
}

/// Guide point layout requested by the user. `Random` is resolved to one of
/// the concrete shapes once per session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circular,
    Rectangular,
    Figure8,
    #[default]
    Random,
}

impl Shape {
    pub const CONCRETE: [Shape; 3] = [Shape::Circular, Shape::Rectangular, Shape::Figure8];
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circular => write!(f, "circular"),
            Shape::Rectangular => write!(f, "rectangular"),
            Shape::Figure8 => write!(f, "figure8"),
            Shape::Random => write!(f, "random"),
        }
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "circular" | "circle" => Ok(Shape::Circular),
            "rectangular" | "rectangle" => Ok(Shape::Rectangular),
            "figure8" | "fig8" => Ok(Shape::Figure8),
            "random" => Ok(Shape::Random),
            _ => Err(format!("Invalid shape method: '{}'", s)),
        }
    }
}

/// Everything needed to propose an initial ring of guide points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopSpec {
    pub base: GeoPoint,
    pub length_m: f64,
    /// 0 (or absent) for a random heading, 1..=8 for a compass sector
    #[serde(default)]
    pub heading: Option<u8>,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub shape: Shape,
}
