pub mod directions;
pub mod geo_math;
pub mod guide_points;
pub mod improvement_cycle;
pub mod tail_cleaner;
pub mod waypoint_reconciler;
