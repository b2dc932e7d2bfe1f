//! Global Cache Registry
//!
//! Per-instance caches that live as long as the owning object. The registry
//! is a side-table from owner identity to that owner's store directory.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::Result;
use crate::registry::{
    method_identity, CacheOwner, CacheRegistry, ErasedStore, SharedStore, StoreDirectory,
};

static GLOBAL_REGISTRY: Lazy<GlobalRegistry> = Lazy::new(GlobalRegistry::new);

// == Global Registry ==
#[derive(Default)]
pub struct GlobalRegistry {
    owners: Mutex<HashMap<u64, StoreDirectory>>,
}

impl GlobalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by `Scope::Global`.
    pub fn instance() -> &'static GlobalRegistry {
        &GLOBAL_REGISTRY
    }

    /// Drops every store of the owner with the given identity.
    pub fn release(&self, identity: u64) {
        // Stores are dropped after the lock is released: cached values may
        // own identities of their own.
        let released = self.owners.lock().remove(&identity);
        if released.is_some() {
            trace!(identity, "released global caches");
        }
    }

    /// Removes expired entries from every store and returns how many went.
    pub fn purge_expired(&self) -> usize {
        let stores: Vec<Arc<dyn ErasedStore>> = self
            .owners
            .lock()
            .values()
            .flat_map(StoreDirectory::stores)
            .collect();

        stores.iter().map(|store| store.purge_expired()).sum()
    }

    /// Number of owners that currently have at least one store.
    pub fn owner_count(&self) -> usize {
        self.owners.lock().len()
    }
}

impl CacheRegistry for GlobalRegistry {
    fn get_or_init<O, V>(&self, owner: &O, method: &str) -> Result<SharedStore<V>>
    where
        O: CacheOwner,
        V: Clone + Send + 'static,
    {
        let identity = method_identity::<O>(method);
        self.owners
            .lock()
            .entry(owner.cache_identity().id())
            .or_default()
            .get_or_init(method, &identity)
    }

    fn lookup<O: CacheOwner>(&self, owner: &O, method: &str) -> Option<Arc<dyn ErasedStore>> {
        self.owners
            .lock()
            .get(&owner.cache_identity().id())
            .and_then(|directory| directory.lookup(method))
    }

    fn methods<O: CacheOwner>(&self, owner: &O) -> BTreeSet<String> {
        self.owners
            .lock()
            .get(&owner.cache_identity().id())
            .map(StoreDirectory::methods)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CacheKey;
    use crate::registry::CacheIdentity;
    use std::time::Duration;

    #[derive(Default)]
    struct Owner {
        identity: CacheIdentity,
    }

    impl CacheOwner for Owner {
        fn cache_identity(&self) -> &CacheIdentity {
            &self.identity
        }
    }

    #[test]
    fn test_same_owner_same_store() {
        let registry = GlobalRegistry::new();
        let owner = Owner::default();

        let first = registry.get_or_init::<_, u32>(&owner, "find").unwrap();
        let second = registry.get_or_init::<_, u32>(&owner, "find").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_instances_do_not_share_stores() {
        let registry = GlobalRegistry::new();
        let a = Owner::default();
        let b = Owner::default();

        let store_a = registry.get_or_init::<_, u32>(&a, "find").unwrap();
        let store_b = registry.get_or_init::<_, u32>(&b, "find").unwrap();
        store_a.lock().set(CacheKey::NoArgs, 7, None);

        assert!(!Arc::ptr_eq(&store_a, &store_b));
        assert_eq!(store_b.lock().get(&CacheKey::NoArgs), None);
    }

    #[test]
    fn test_methods_directory() {
        let registry = GlobalRegistry::new();
        let owner = Owner::default();

        assert!(registry.methods(&owner).is_empty());
        registry.get_or_init::<_, u32>(&owner, "find").unwrap();
        registry.get_or_init::<_, String>(&owner, "name").unwrap();

        let methods: Vec<_> = registry.methods(&owner).into_iter().collect();
        assert_eq!(methods, vec!["find".to_string(), "name".to_string()]);
        assert!(registry.lookup(&owner, "find").is_some());
        assert!(registry.lookup(&owner, "other").is_none());
    }

    #[test]
    fn test_dropping_owner_releases_global_caches() {
        let owner = Owner::default();
        let id = owner.cache_identity().id();
        let registry = GlobalRegistry::instance();

        registry.get_or_init::<_, u32>(&owner, "find").unwrap();
        assert!(registry.owners.lock().contains_key(&id));

        drop(owner);

        assert!(!registry.owners.lock().contains_key(&id));
    }

    #[test]
    fn test_purge_expired_across_owners() {
        let registry = GlobalRegistry::new();
        let a = Owner::default();
        let b = Owner::default();

        let store_a = registry.get_or_init::<_, u32>(&a, "find").unwrap();
        let store_b = registry.get_or_init::<_, u32>(&b, "find").unwrap();
        store_a.lock().set(CacheKey::NoArgs, 1, Some(Duration::from_millis(50)));
        store_b.lock().set(CacheKey::NoArgs, 2, Some(Duration::from_millis(50)));
        store_b.lock().set(CacheKey::NullValue, 3, None);

        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(registry.purge_expired(), 2);
        assert_eq!(store_b.lock().len(), 1);
        assert_eq!(registry.owner_count(), 2);
    }
}
