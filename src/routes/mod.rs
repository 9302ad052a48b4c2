pub mod debug;
pub mod guide_points;
pub mod refine;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/guide-points", get(guide_points::generate_guide_points))
        .route("/routes/refine", get(refine::refine_route))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
