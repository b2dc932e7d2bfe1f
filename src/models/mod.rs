//! Request and Response models for the demo server
//!
//! DTOs used for serializing/deserializing HTTP query strings and bodies.

pub mod requests;
pub mod responses;

pub use requests::{SeedTokenQuery, TokenQuery};
pub use responses::{HealthResponse, SeededTokenResponse, TokenResponse};
