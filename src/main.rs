use axum::Router;
use loopsmith::cache::CachedDirectionsClient;
use loopsmith::config::Config;
use loopsmith::services::directions::{DirectionsClient, OpenRouteServiceClient};
use loopsmith::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loopsmith=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting loopsmith API server");
    tracing::info!(
        max_rounds = config.refinement.max_rounds,
        tail_fraction = config.refinement.tail_fraction_threshold,
        "Configuration loaded successfully"
    );

    // Directions client, optionally pointed at a self-hosted instance
    let ors_client = match config.ors_base_url {
        Some(ref base_url) => {
            tracing::info!("Using OpenRouteService at {}", base_url);
            OpenRouteServiceClient::with_base_url(config.ors_api_key.clone(), base_url.clone())
        }
        None => OpenRouteServiceClient::new(config.ors_api_key.clone()),
    };

    let directions: Arc<dyn DirectionsClient> = Arc::new(CachedDirectionsClient::new(
        Arc::new(ors_client),
        config.directions_cache_ttl,
        config.directions_cache_max_entries,
    ));
    tracing::info!(
        ttl_seconds = config.directions_cache_ttl,
        max_entries = config.directions_cache_max_entries,
        "In-memory directions cache enabled"
    );

    // Create application state
    let state = Arc::new(AppState::new(directions, config.refinement.clone()));

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", loopsmith::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
