//! Token Service
//!
//! Issues access tokens. Issuing is slow and every token is unique, so the
//! service caches the token per request: everything that asks for a token
//! while serving one request gets the same one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::cache_args;
use crate::cacheable::Cacheable;
use crate::error::Result;
use crate::key::CacheKey;
use crate::ops::{context_local_clear, context_local_keys, context_local_set};
use crate::registry::{CacheIdentity, CacheOwner, Scope};

#[derive(Debug, Default)]
pub struct TokenService {
    identity: CacheIdentity,
    issued: AtomicU64,
}

impl CacheOwner for TokenService {
    fn cache_identity(&self) -> &CacheIdentity {
        &self.identity
    }
}

impl TokenService {
    const TOKEN: Cacheable = Cacheable::method("token").with_scope(Scope::ContextLocal);

    pub fn new() -> Self {
        Self::default()
    }

    /// The token for `audience` in the active request.
    ///
    /// # Errors
    /// `NoActiveContext` outside of a request context.
    pub async fn token(&self, audience: &str) -> Result<String> {
        let token = Self::TOKEN.call_async(self, &cache_args![audience], || self.issue(audience))?;
        Ok(token.await)
    }

    /// Makes `token` the answer for `audience` for the rest of the request.
    pub fn seed(&self, audience: &str, token: String) -> Result<()> {
        context_local_set(self, Self::TOKEN.name(), &cache_args![audience], token)
    }

    /// Drops every token cached for the active request.
    pub fn forget(&self) -> Result<()> {
        context_local_clear(self, Self::TOKEN.name())
    }

    /// Keys of the tokens cached for the active request.
    pub fn cached_keys(&self) -> Result<Vec<CacheKey>> {
        context_local_keys(self, Self::TOKEN.name())
    }

    /// Number of tokens issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    async fn issue(&self, audience: &str) -> String {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.issued.fetch_add(1, Ordering::Relaxed);
        debug!(audience, "token issued");
        format!("{}.{}", audience, Uuid::new_v4().simple())
    }
}
