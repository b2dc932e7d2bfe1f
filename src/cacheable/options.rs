//! Cacheable Options
//!
//! Per-method caching configuration.

use std::time::Duration;

use crate::registry::Scope;

/// What a cache is being attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Method,
    /// Zero-argument accessor
    Getter,
    Setter,
    Field,
}

// == Cacheable Options ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheableOptions {
    /// Which registry holds the cache. Defaults to `Scope::Global`.
    pub scope: Scope,
    /// Time-to-live of each entry. `None` (the default) caches indefinitely;
    /// consider the memory use of that for methods with unbounded inputs.
    pub ttl: Option<Duration>,
    /// Whether an undefined result (`None`, `()`) is cached. Defaults to true.
    ///
    /// Only undefined results are affected: a present-but-null value such as
    /// `serde_json::Value::Null` is always cached. Turn this off for values
    /// that are immutable once they exist but may not exist yet.
    pub cache_undefined: bool,
}

impl CacheableOptions {
    pub const fn new() -> Self {
        Self {
            scope: Scope::Global,
            ttl: None,
            cache_undefined: true,
        }
    }

    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub const fn with_cache_undefined(mut self, cache_undefined: bool) -> Self {
        self.cache_undefined = cache_undefined;
        self
    }
}

impl Default for CacheableOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CacheableOptions::default();
        assert_eq!(options.scope, Scope::Global);
        assert_eq!(options.ttl, None);
        assert!(options.cache_undefined);
    }

    #[test]
    fn test_builder_is_const() {
        const OPTIONS: CacheableOptions = CacheableOptions::new()
            .with_scope(Scope::ContextLocal)
            .with_ttl(Duration::from_millis(1000))
            .with_cache_undefined(false);

        assert_eq!(OPTIONS.scope, Scope::ContextLocal);
        assert_eq!(OPTIONS.ttl, Some(Duration::from_secs(1)));
        assert!(!OPTIONS.cache_undefined);
    }
}
