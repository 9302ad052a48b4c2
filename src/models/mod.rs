pub mod directions;
pub mod geo_point;
pub mod loop_spec;
pub mod path;
pub mod refinement;

pub use directions::{AvoidFeature, DirectionsRequest, RoutingOptions, TravelMode, Weightings};
pub use geo_point::GeoPoint;
pub use loop_spec::{LoopSpec, Rotation, Shape};
pub use path::{Path, PathPoint, RouteStep};
pub use refinement::{RefinementEvent, RoundCounts};
