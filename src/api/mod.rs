//! API Module
//!
//! Demo HTTP server showing request-scoped caching.
//!
//! # Endpoints
//! - `GET /token` - Token cached for the duration of one request
//! - `GET /token/seeded` - Token cache seeded and cleared by hand
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod tokens;

pub use handlers::*;
pub use middleware::request_context;
pub use routes::create_router;
pub use tokens::TokenService;
