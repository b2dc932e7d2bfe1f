//! Store Directory
//!
//! The per-owner map from method name to its store. Stores hold typed values,
//! so the directory keeps them type-erased and downcasts on access.

use std::any::{type_name, Any};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, ExpiringMap};
use crate::error::{CacheError, Result};
use crate::key::CacheKey;

/// Expiring map holding one method's cached results.
pub type Store<V> = Mutex<ExpiringMap<CacheKey, V>>;

/// Handle to a store shared between the registry and callers.
pub type SharedStore<V> = Arc<Store<V>>;

// == Erased Store ==
/// Value-type independent view of a store, used by operations that never
/// read values (delete, clear, keys, sweeping).
pub trait ErasedStore: Send + Sync {
    fn delete(&self, key: &CacheKey) -> bool;
    fn clear(&self);
    fn keys(&self) -> Vec<CacheKey>;
    fn purge_expired(&self) -> usize;
    fn stats(&self) -> CacheStats;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<V> ErasedStore for Store<V>
where
    V: Clone + Send + 'static,
{
    fn delete(&self, key: &CacheKey) -> bool {
        self.lock().delete(key)
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn keys(&self) -> Vec<CacheKey> {
        let mut keys = self.lock().keys();
        keys.sort();
        keys
    }

    fn purge_expired(&self) -> usize {
        self.lock().purge_expired()
    }

    fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Recovers the typed store behind an erased one.
///
/// # Errors
/// `StoreTypeMismatch` if the store holds values of another type.
pub fn downcast_store<V>(erased: Arc<dyn ErasedStore>, identity: &str) -> Result<SharedStore<V>>
where
    V: Clone + Send + 'static,
{
    erased
        .into_any()
        .downcast::<Store<V>>()
        .map_err(|_| CacheError::StoreTypeMismatch {
            identity: identity.to_string(),
            expected: type_name::<V>().to_string(),
        })
}

// == Store Directory ==
/// Method name to store, for a single owner.
#[derive(Default)]
pub struct StoreDirectory {
    stores: HashMap<String, Arc<dyn ErasedStore>>,
}

impl StoreDirectory {
    /// Returns the store for `method`, creating it on first use.
    ///
    /// # Errors
    /// `StoreTypeMismatch` if the store was created for another value type.
    pub fn get_or_init<V>(&mut self, method: &str, identity: &str) -> Result<SharedStore<V>>
    where
        V: Clone + Send + 'static,
    {
        let erased = self
            .stores
            .entry(method.to_string())
            .or_insert_with(|| {
                debug!(identity, "creating cache store");
                Arc::new(Store::<V>::new(ExpiringMap::new())) as Arc<dyn ErasedStore>
            })
            .clone();

        downcast_store(erased, identity)
    }

    pub fn lookup(&self, method: &str) -> Option<Arc<dyn ErasedStore>> {
        self.stores.get(method).cloned()
    }

    pub fn methods(&self) -> BTreeSet<String> {
        self.stores.keys().cloned().collect()
    }

    pub fn stores(&self) -> Vec<Arc<dyn ErasedStore>> {
        self.stores.values().cloned().collect()
    }
}
