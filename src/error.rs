use crate::services::directions::DirectionsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot reconcile waypoints against an empty path")]
    EmptyPath,

    #[error("Unroutable point at coordinate {index}: {message}")]
    UnroutablePoint { index: usize, message: String },

    #[error("Route too large: {0}")]
    RouteTooLarge(String),

    #[error("Refinement did not converge within {rounds} rounds")]
    ConvergenceTimeout { rounds: u32 },

    #[error("Directions service error: {0}")]
    Directions(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to the end user when a refinement session fails
    pub fn user_message(&self) -> String {
        match self {
            AppError::RouteTooLarge(_) => {
                "The requested route is too long for the routing service. Please try a shorter route."
                    .to_string()
            }
            AppError::UnroutablePoint { .. } => {
                "The start location could not be reached by road. Please pick a different start point."
                    .to_string()
            }
            AppError::ConvergenceTimeout { .. } => {
                "The route could not be refined. Please try a shorter route.".to_string()
            }
            AppError::InvalidArgument(e) => e.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            _ => "Routing failed. Please try a shorter route.".to_string(),
        }
    }
}

impl From<DirectionsError> for AppError {
    fn from(err: DirectionsError) -> Self {
        match err {
            DirectionsError::UnroutablePoint { index, message } => {
                AppError::UnroutablePoint { index, message }
            }
            DirectionsError::RouteTooLarge(message) => AppError::RouteTooLarge(message),
            other => AppError::Directions(other.to_string()),
        }
    }
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidArgument(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::EmptyPath => {
                tracing::warn!("Waypoint reconciliation against an empty path");
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::UnroutablePoint { index, ref message } => {
                tracing::info!(index, "Unroutable point: {}", message);
                (StatusCode::UNPROCESSABLE_ENTITY, self.user_message())
            }
            AppError::RouteTooLarge(ref e) => {
                tracing::info!("Route too large: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, self.user_message())
            }
            AppError::ConvergenceTimeout { rounds } => {
                tracing::warn!(rounds, "Refinement did not converge");
                (StatusCode::INTERNAL_SERVER_ERROR, self.user_message())
            }
            AppError::Directions(ref e) => {
                tracing::error!("Directions service error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error".to_string())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
