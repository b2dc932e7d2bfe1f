//! Interception Wrapper
//!
//! `Cacheable` sits in front of one method. Each call derives the key,
//! resolves the store for the configured scope, and either returns the
//! cached value or runs the computation and records its result.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::cacheable::{CacheValue, CacheableOptions, PropertyKind};
use crate::error::{CacheError, Result};
use crate::key::{build_key, CacheArg, CacheKey};
use crate::registry::{method_identity, CacheOwner, CacheRegistry, Scope, ScopeRegistry, SharedStore};

// == Cacheable ==
/// Caching installed on a single method or getter.
///
/// ```
/// use std::time::Duration;
/// use cacheable::{cache_args, CacheIdentity, CacheOwner, Cacheable};
///
/// #[derive(Default)]
/// struct RateRepository {
///     identity: CacheIdentity,
/// }
///
/// impl CacheOwner for RateRepository {
///     fn cache_identity(&self) -> &CacheIdentity {
///         &self.identity
///     }
/// }
///
/// impl RateRepository {
///     const RATE: Cacheable = Cacheable::method("rate").with_ttl(Duration::from_secs(60));
///
///     fn rate(&self, currency: &str) -> cacheable::Result<f64> {
///         Self::RATE.call(self, &cache_args![currency], || self.fetch_rate(currency))
///     }
///
///     fn fetch_rate(&self, _currency: &str) -> f64 {
///         1.08
///     }
/// }
///
/// let repository = RateRepository::default();
/// assert_eq!(repository.rate("EUR").unwrap(), 1.08);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Cacheable {
    name: &'static str,
    kind: PropertyKind,
    options: CacheableOptions,
}

/// Writes a computed result back to its store if it is eligible.
struct Recorder<V> {
    store: SharedStore<V>,
    key: CacheKey,
    identity: String,
    ttl: Option<Duration>,
    cache_undefined: bool,
}

impl<V: CacheValue> Recorder<V> {
    fn record(self, value: &V) {
        if value.is_undefined() && !self.cache_undefined {
            debug!(identity = %self.identity, key = %self.key, "undefined result not cached");
            return;
        }
        self.store.lock().set(self.key, value.clone(), self.ttl);
    }
}

enum Lookup<V, Fut> {
    Hit(V),
    Miss(Fut),
}

impl Cacheable {
    /// Caching for a method, with default options.
    pub const fn method(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Method,
            options: CacheableOptions::new(),
        }
    }

    /// Caching for a zero-argument accessor, with default options.
    pub const fn getter(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Getter,
            options: CacheableOptions::new(),
        }
    }

    /// Attaches caching to a property of the given kind.
    ///
    /// # Errors
    /// `UncacheableProperty` for anything but a method or getter.
    pub fn install(name: &'static str, kind: PropertyKind, options: CacheableOptions) -> Result<Self> {
        match kind {
            PropertyKind::Method | PropertyKind::Getter => Ok(Self {
                name,
                kind,
                options,
            }),
            PropertyKind::Setter | PropertyKind::Field => Err(CacheError::UncacheableProperty {
                property: name.to_string(),
                reason: "only methods and getters can be cached".to_string(),
            }),
        }
    }

    pub const fn with_options(mut self, options: CacheableOptions) -> Self {
        self.options = options;
        self
    }

    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.options = self.options.with_scope(scope);
        self
    }

    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.options = self.options.with_ttl(ttl);
        self
    }

    pub const fn with_cache_undefined(mut self, cache_undefined: bool) -> Self {
        self.options = self.options.with_cache_undefined(cache_undefined);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn options(&self) -> &CacheableOptions {
        &self.options
    }

    // == Call ==
    /// Returns the cached result for `args`, computing and caching it on a miss.
    ///
    /// # Errors
    /// Key derivation and scope resolution errors, raised before `compute` runs.
    pub fn call<O, V, F>(&self, owner: &O, args: &[CacheArg], compute: F) -> Result<V>
    where
        O: CacheOwner,
        V: CacheValue,
        F: FnOnce() -> V,
    {
        let (cached, recorder) = self.lookup(owner, args)?;
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = compute();
        recorder.record(&value);
        Ok(value)
    }

    /// Like `call`, for computations that can fail. Errors are returned as-is
    /// and never cached.
    pub fn try_call<O, V, E, F>(&self, owner: &O, args: &[CacheArg], compute: F) -> std::result::Result<V, E>
    where
        O: CacheOwner,
        V: CacheValue,
        E: From<CacheError>,
        F: FnOnce() -> std::result::Result<V, E>,
    {
        let (cached, recorder) = self.lookup(owner, args)?;
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = compute()?;
        recorder.record(&value);
        Ok(value)
    }

    // == Call Async ==
    /// Asynchronous `call`.
    ///
    /// Key derivation, scope resolution and the cache lookup happen before
    /// this returns, so their errors are reported immediately. On a hit the
    /// returned future resolves on first poll without calling `compute`. On a
    /// miss the result is recorded once the computation resolves; a
    /// computation that never resolves leaves nothing behind.
    pub fn call_async<'a, O, V, F, Fut>(
        &self,
        owner: &O,
        args: &[CacheArg],
        compute: F,
    ) -> Result<impl Future<Output = V> + 'a>
    where
        O: CacheOwner,
        V: CacheValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + 'a,
    {
        let (cached, recorder) = self.lookup(owner, args)?;
        let lookup = match cached {
            Some(value) => Lookup::Hit(value),
            None => Lookup::Miss(compute()),
        };

        Ok(async move {
            match lookup {
                Lookup::Hit(value) => value,
                Lookup::Miss(pending) => {
                    let value = pending.await;
                    recorder.record(&value);
                    value
                }
            }
        })
    }

    /// Asynchronous `try_call`. Only `Ok` results are cached.
    pub fn try_call_async<'a, O, V, E, F, Fut>(
        &self,
        owner: &O,
        args: &[CacheArg],
        compute: F,
    ) -> Result<impl Future<Output = std::result::Result<V, E>> + 'a>
    where
        O: CacheOwner,
        V: CacheValue,
        E: 'a,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>> + 'a,
    {
        let (cached, recorder) = self.lookup(owner, args)?;
        let lookup = match cached {
            Some(value) => Lookup::Hit(value),
            None => Lookup::Miss(compute()),
        };

        Ok(async move {
            match lookup {
                Lookup::Hit(value) => Ok(value),
                Lookup::Miss(pending) => {
                    let result = pending.await;
                    if let Ok(value) = &result {
                        recorder.record(value);
                    }
                    result
                }
            }
        })
    }

    /// Derives the key, resolves the store and reads it.
    fn lookup<O, V>(&self, owner: &O, args: &[CacheArg]) -> Result<(Option<V>, Recorder<V>)>
    where
        O: CacheOwner,
        V: CacheValue,
    {
        let identity = method_identity::<O>(self.name);
        if self.kind == PropertyKind::Getter && !args.is_empty() {
            return Err(CacheError::UncacheableProperty {
                property: identity,
                reason: format!("getter called with {} argument(s)", args.len()),
            });
        }

        let key = build_key(args, &identity)?;
        let store = ScopeRegistry::for_scope(self.options.scope)?.get_or_init::<O, V>(owner, self.name)?;

        let cached = store.lock().get(&key);
        match cached {
            Some(_) => debug!(identity = %identity, key = %key, "cache hit"),
            None => debug!(identity = %identity, key = %key, "cache miss"),
        }

        Ok((
            cached,
            Recorder {
                store,
                key,
                identity,
                ttl: self.options.ttl,
                cache_undefined: self.options.cache_undefined,
            },
        ))
    }
}
