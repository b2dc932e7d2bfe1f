//! API Routes
//!
//! Configures the Axum router with all demo server endpoints.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, seeded_token_handler, token_handler, AppState};
use super::middleware::request_context;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /token?audience=..` - Request-scoped cached token
/// - `GET /token/seeded?audience=..&token=..` - Seed, read back and clear the
///   request's token cache through the direct operations
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Request context: every request runs in its own `RequestContext`
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/token", get(token_handler))
        .route("/token/seeded", get(seeded_token_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(request_context))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
