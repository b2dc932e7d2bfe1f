//! API Handlers
//!
//! HTTP request handlers for each demo server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::api::TokenService;
use crate::error::Result;
use crate::models::{
    HealthResponse, SeedTokenQuery, SeededTokenResponse, TokenQuery, TokenResponse,
};
use crate::registry::RequestContext;

/// Application state shared across all handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// One service for the whole server; its token cache is per request
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(tokens: TokenService) -> Self {
        Self {
            tokens: Arc::new(tokens),
        }
    }
}

/// Handler for GET /token
///
/// Looks the token up twice; the second lookup is served from the
/// request's cache.
pub async fn token_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>> {
    let context = RequestContext::current()?;
    let audience = query.audience();

    let token = state.tokens.token(audience).await?;
    let repeated = state.tokens.token(audience).await?;

    Ok(Json(TokenResponse::new(context.id(), audience, token, repeated)))
}

/// Handler for GET /token/seeded
///
/// Seeds the request's token cache directly, reads the seeded token back,
/// then clears the cache so the next lookup issues a fresh token.
pub async fn seeded_token_handler(
    State(state): State<AppState>,
    Query(query): Query<SeedTokenQuery>,
) -> Result<Json<SeededTokenResponse>> {
    let context = RequestContext::current()?;
    let audience = query.audience();
    let seeded = query.token().to_string();

    state.tokens.seed(audience, seeded.clone())?;
    let served = state.tokens.token(audience).await?;
    let cached_before_clear = state.tokens.cached_keys()?.len();
    state.tokens.forget()?;
    let reissued = state.tokens.token(audience).await?;

    Ok(Json(SeededTokenResponse {
        request_id: context.id(),
        audience: audience.to_string(),
        seeded,
        served,
        cached_before_clear,
        reissued,
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
