//! Cache Owners
//!
//! Objects whose methods are cached carry a `CacheIdentity`. The global
//! registry keys its side-table by that identity, so caches are per instance
//! and disappear with the instance.

use std::any::type_name;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::GlobalRegistry;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

// == Cache Identity ==
/// Unique identity of one owning instance.
///
/// Cloning allocates a fresh identity: a cloned owner starts with empty caches.
/// Dropping the identity releases the instance's global caches.
#[derive(Debug)]
pub struct CacheIdentity {
    id: u64,
}

impl CacheIdentity {
    pub fn new() -> Self {
        Self {
            id: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Default for CacheIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CacheIdentity {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl PartialEq for CacheIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CacheIdentity {}

impl Drop for CacheIdentity {
    fn drop(&mut self) {
        GlobalRegistry::instance().release(self.id);
    }
}

// == Cache Owner ==
/// A type whose methods may be cached.
///
/// ```
/// use cacheable::{CacheIdentity, CacheOwner};
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
/// ```
pub trait CacheOwner: 'static {
    fn cache_identity(&self) -> &CacheIdentity;
}

/// `Type::method`, used to name a cached method in logs and errors.
pub fn method_identity<O: ?Sized>(method: &str) -> String {
    format!("{}::{}", short_type_name::<O>(), method)
}

/// Last path segment of a type name, without generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
