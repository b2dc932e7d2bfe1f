//! Request DTOs for the demo server

use serde::Deserialize;

/// Audience used when a token request names none.
pub const DEFAULT_AUDIENCE: &str = "default";

/// Query string of `GET /token`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    /// Who the token is issued for
    #[serde(default)]
    pub audience: Option<String>,
}

impl TokenQuery {
    pub fn audience(&self) -> &str {
        audience_or_default(self.audience.as_deref())
    }
}

/// Token used when a seed request names none.
pub const DEFAULT_SEED: &str = "seeded";

/// Query string of `GET /token/seeded`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedTokenQuery {
    #[serde(default)]
    pub audience: Option<String>,
    /// Token to place in the request's cache
    #[serde(default)]
    pub token: Option<String>,
}

impl SeedTokenQuery {
    pub fn audience(&self) -> &str {
        audience_or_default(self.audience.as_deref())
    }

    pub fn token(&self) -> &str {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .unwrap_or(DEFAULT_SEED)
    }
}

fn audience_or_default(audience: Option<&str>) -> &str {
    audience
        .filter(|audience| !audience.is_empty())
        .unwrap_or(DEFAULT_AUDIENCE)
}
