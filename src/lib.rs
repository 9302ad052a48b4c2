// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use config::RefinementConfig;
use services::directions::DirectionsClient;
use services::improvement_cycle::ImprovementCycle;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub directions: Arc<dyn DirectionsClient>,
    pub refinement: RefinementConfig,
}

impl AppState {
    pub fn new(directions: Arc<dyn DirectionsClient>, refinement: RefinementConfig) -> Self {
        AppState {
            directions,
            refinement,
        }
    }

    pub fn improvement_cycle(&self) -> ImprovementCycle {
        ImprovementCycle::new(self.directions.clone(), &self.refinement)
    }
}
