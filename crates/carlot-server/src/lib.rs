//! Carlot HTTP Server
//!
//! Serves the car entry form, accepts submissions and renders the paginated
//! listing on top of the stores from `carlot`.

use axum::{Router, extract::DefaultBodyLimit, http::HeaderValue, routing::get};
use carlot::{Stores, TokenSigner};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub mod config;
pub mod error;
pub mod models;
pub mod routes;

use config::ServerConfig;

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub signer: TokenSigner,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(stores: Stores, config: ServerConfig) -> Self {
        Self {
            stores,
            signer: TokenSigner::new(config.csrf_secret.clone()),
            config: Arc::new(config),
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))
        // Pages and the client script
        .merge(routes::pages::router())
        .nest("/cars", routes::cars::router())
        .nest("/media", routes::media::router())
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
}
