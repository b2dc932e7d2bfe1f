//! Response DTOs for the demo server

use serde::Serialize;

/// Response body of `GET /token`
///
/// The token is looked up twice while handling one request; both lookups
/// see the same request-scoped cache.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// Id of the request context that served the request
    pub request_id: u64,
    pub audience: String,
    /// Token from the first lookup
    pub token: String,
    /// Token from the second lookup
    pub repeated: String,
    /// Whether the second lookup returned the first one's token
    pub cached: bool,
}

impl TokenResponse {
    pub fn new(request_id: u64, audience: impl Into<String>, token: String, repeated: String) -> Self {
        Self {
            request_id,
            audience: audience.into(),
            cached: token == repeated,
            token,
            repeated,
        }
    }
}

/// Response body of `GET /token/seeded`
#[derive(Debug, Clone, Serialize)]
pub struct SeededTokenResponse {
    pub request_id: u64,
    pub audience: String,
    /// Token placed in the request's cache
    pub seeded: String,
    /// Token returned by the lookup that followed the seed
    pub served: String,
    /// Tokens cached for the request before it was cleared
    pub cached_before_clear: usize,
    /// Token returned after the request's cache was cleared
    pub reissued: String,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
