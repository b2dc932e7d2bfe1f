//! Direct Cache Operations
//!
//! Read, seed and invalidate cached results outside the normal call path.
//! Entries are addressed by (owner, method name, arguments) and keyed exactly
//! as `Cacheable` keys them, so both paths see the same cache.
//!
//! The `global_*` and `context_local_*` functions pick the registry for their
//! scope; the `*_in` functions take any registry, such as an explicitly
//! threaded `RequestContext`.

use std::collections::BTreeSet;

use tracing::debug;

use crate::cacheable::CacheValue;
use crate::error::Result;
use crate::key::{build_key, CacheArg, CacheKey};
use crate::registry::{
    downcast_store, method_identity, CacheOwner, CacheRegistry, GlobalRegistry, RequestContext,
};

// == Registry-Generic Operations ==

/// Returns the cached value, never computing one. A method that has no
/// cache yet reads as empty and is left without one.
///
/// # Errors
/// `StoreTypeMismatch` only when the method's cache exists and holds
/// another value type.
pub fn get_in<R, O, V>(registry: &R, target: &O, method: &str, args: &[CacheArg]) -> Result<Option<V>>
where
    R: CacheRegistry,
    O: CacheOwner,
    V: CacheValue,
{
    let identity = method_identity::<O>(method);
    let key = build_key(args, &identity)?;
    let Some(erased) = registry.lookup(target, method) else {
        return Ok(None);
    };
    let store = downcast_store::<V>(erased, &identity)?;
    let value = store.lock().get(&key);
    Ok(value)
}

/// Writes a value unconditionally, with no TTL. Undefined values are stored
/// even where the method's options would skip them.
pub fn set_in<R, O, V>(registry: &R, target: &O, method: &str, args: &[CacheArg], value: V) -> Result<()>
where
    R: CacheRegistry,
    O: CacheOwner,
    V: CacheValue,
{
    let identity = method_identity::<O>(method);
    let key = build_key(args, &identity)?;
    let store = registry.get_or_init::<O, V>(target, method)?;
    debug!(identity = %identity, key = %key, "cache entry seeded");
    store.lock().set(key, value, None);
    Ok(())
}

/// Removes the entry for `args`; a missing entry or store is not an error.
pub fn delete_in<R, O>(registry: &R, target: &O, method: &str, args: &[CacheArg]) -> Result<()>
where
    R: CacheRegistry,
    O: CacheOwner,
{
    let identity = method_identity::<O>(method);
    let key = build_key(args, &identity)?;
    if let Some(store) = registry.lookup(target, method) {
        if store.delete(&key) {
            debug!(identity = %identity, key = %key, "cache entry deleted");
        }
    }
    Ok(())
}

/// Removes every entry of the method.
pub fn clear_in<R, O>(registry: &R, target: &O, method: &str)
where
    R: CacheRegistry,
    O: CacheOwner,
{
    if let Some(store) = registry.lookup(target, method) {
        store.clear();
        debug!(identity = %method_identity::<O>(method), "cache cleared");
    }
}

/// Names of the owner's methods that have a cache.
pub fn methods_in<R, O>(registry: &R, target: &O) -> BTreeSet<String>
where
    R: CacheRegistry,
    O: CacheOwner,
{
    registry.methods(target)
}

/// Live keys of the method's cache, in key order.
pub fn keys_in<R, O>(registry: &R, target: &O, method: &str) -> Vec<CacheKey>
where
    R: CacheRegistry,
    O: CacheOwner,
{
    registry
        .lookup(target, method)
        .map(|store| store.keys())
        .unwrap_or_default()
}

// == Global Scope ==

pub fn global_get<O: CacheOwner, V: CacheValue>(target: &O, method: &str, args: &[CacheArg]) -> Result<Option<V>> {
    get_in(GlobalRegistry::instance(), target, method, args)
}

pub fn global_set<O: CacheOwner, V: CacheValue>(target: &O, method: &str, args: &[CacheArg], value: V) -> Result<()> {
    set_in(GlobalRegistry::instance(), target, method, args, value)
}

pub fn global_delete<O: CacheOwner>(target: &O, method: &str, args: &[CacheArg]) -> Result<()> {
    delete_in(GlobalRegistry::instance(), target, method, args)
}

pub fn global_clear<O: CacheOwner>(target: &O, method: &str) {
    clear_in(GlobalRegistry::instance(), target, method)
}

pub fn global_methods<O: CacheOwner>(target: &O) -> BTreeSet<String> {
    methods_in(GlobalRegistry::instance(), target)
}

pub fn global_keys<O: CacheOwner>(target: &O, method: &str) -> Vec<CacheKey> {
    keys_in(GlobalRegistry::instance(), target, method)
}

// == Context-Local Scope ==
// Each resolves the active request context and fails with `NoActiveContext`
// outside of one.

pub fn context_local_get<O: CacheOwner, V: CacheValue>(
    target: &O,
    method: &str,
    args: &[CacheArg],
) -> Result<Option<V>> {
    get_in(&RequestContext::current()?, target, method, args)
}

pub fn context_local_set<O: CacheOwner, V: CacheValue>(
    target: &O,
    method: &str,
    args: &[CacheArg],
    value: V,
) -> Result<()> {
    set_in(&RequestContext::current()?, target, method, args, value)
}

pub fn context_local_delete<O: CacheOwner>(target: &O, method: &str, args: &[CacheArg]) -> Result<()> {
    delete_in(&RequestContext::current()?, target, method, args)
}

pub fn context_local_clear<O: CacheOwner>(target: &O, method: &str) -> Result<()> {
    clear_in(&RequestContext::current()?, target, method);
    Ok(())
}

pub fn context_local_methods<O: CacheOwner>(target: &O) -> Result<BTreeSet<String>> {
    Ok(methods_in(&RequestContext::current()?, target))
}

pub fn context_local_keys<O: CacheOwner>(target: &O, method: &str) -> Result<Vec<CacheKey>> {
    Ok(keys_in(&RequestContext::current()?, target, method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache_args;
    use crate::cacheable::Cacheable;
    use crate::error::CacheError;
    use crate::registry::{CacheIdentity, Scope};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Repository {
        identity: CacheIdentity,
        calls: AtomicUsize,
    }

    impl CacheOwner for Repository {
        fn cache_identity(&self) -> &CacheIdentity {
            &self.identity
        }
    }

    impl Repository {
        const COUNT: Cacheable = Cacheable::method("count_by_name");
        const LOCAL: Cacheable = Cacheable::method("local_count").with_scope(Scope::ContextLocal);

        fn count_by_name(&self, name: &str) -> Result<usize> {
            Self::COUNT.call(self, &cache_args![name], || {
                self.calls.fetch_add(1, Ordering::SeqCst) + 100
            })
        }

        fn local_count(&self, name: &str) -> Result<usize> {
            Self::LOCAL.call(self, &cache_args![name], || {
                self.calls.fetch_add(1, Ordering::SeqCst) + 100
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_global_set_is_seen_by_wrapper() {
        let repo = Repository::default();

        global_set(&repo, "count_by_name", &cache_args!["Blues"], 12usize).unwrap();

        assert_eq!(repo.count_by_name("Blues").unwrap(), 12);
        assert_eq!(repo.calls(), 0);
    }

    #[test]
    fn test_global_get_sees_wrapper_results() {
        let repo = Repository::default();

        assert_eq!(
            global_get::<_, usize>(&repo, "count_by_name", &cache_args!["Blues"]).unwrap(),
            None
        );
        repo.count_by_name("Blues").unwrap();

        assert_eq!(
            global_get::<_, usize>(&repo, "count_by_name", &cache_args!["Blues"]).unwrap(),
            Some(100)
        );
        assert_eq!(repo.calls(), 1, "get never computes");
    }

    #[test]
    fn test_get_before_first_call_leaves_method_uncached() {
        let repo = Repository::default();

        assert_eq!(
            global_get::<_, u32>(&repo, "count_by_name", &cache_args!["Blues"]).unwrap(),
            None
        );
        assert!(global_methods(&repo).is_empty());

        assert_eq!(repo.count_by_name("Blues").unwrap(), 100);
        assert_eq!(repo.count_by_name("Finn").unwrap(), 101);
        assert_eq!(repo.count_by_name("Blues").unwrap(), 100);
        assert_eq!(repo.calls(), 2);
    }

    #[test]
    fn test_context_local_get_before_first_call() {
        let repo = Repository::default();

        RequestContext::new().sync_scope(|| {
            assert_eq!(
                context_local_get::<_, String>(&repo, "local_count", &[]).unwrap(),
                None
            );
            assert!(context_local_methods(&repo).unwrap().is_empty());

            assert_eq!(repo.local_count("Blues").unwrap(), 100);
            assert_eq!(repo.local_count("Blues").unwrap(), 100);
        });
        assert_eq!(repo.calls(), 1);
    }

    #[test]
    fn test_global_delete_forces_recompute() {
        let repo = Repository::default();

        repo.count_by_name("Blues").unwrap();
        global_delete(&repo, "count_by_name", &cache_args!["Blues"]).unwrap();
        global_delete(&repo, "count_by_name", &cache_args!["absent"]).unwrap();

        assert_eq!(repo.count_by_name("Blues").unwrap(), 101);
        assert_eq!(repo.calls(), 2);
    }

    #[test]
    fn test_global_clear_removes_all_keys() {
        let repo = Repository::default();

        repo.count_by_name("Blues").unwrap();
        repo.count_by_name("Finn").unwrap();
        assert_eq!(global_keys(&repo, "count_by_name").len(), 2);

        global_clear(&repo, "count_by_name");
        global_clear(&repo, "never_cached");

        assert!(global_keys(&repo, "count_by_name").is_empty());
        repo.count_by_name("Blues").unwrap();
        assert_eq!(repo.calls(), 3);
    }

    #[test]
    fn test_global_methods_and_keys() {
        let repo = Repository::default();

        assert!(global_methods(&repo).is_empty());
        repo.count_by_name("Finn").unwrap();
        repo.count_by_name("Blues").unwrap();

        assert_eq!(
            global_methods(&repo).into_iter().collect::<Vec<_>>(),
            vec!["count_by_name".to_string()]
        );
        assert_eq!(
            global_keys(&repo, "count_by_name"),
            vec![CacheKey::from("\"Blues\""), CacheKey::from("\"Finn\"")]
        );
    }

    #[test]
    fn test_set_bypasses_undefined_gating() {
        let repo = Repository::default();
        let cached = Cacheable::method("maybe").with_cache_undefined(false);

        global_set::<_, Option<u32>>(&repo, "maybe", &[], None).unwrap();

        let value: Option<u32> = cached
            .call(&repo, &[], || {
                repo.calls.fetch_add(1, Ordering::SeqCst);
                Some(1)
            })
            .unwrap();
        assert_eq!(value, None);
        assert_eq!(repo.calls(), 0);
    }

    #[test]
    fn test_ops_surface_key_errors() {
        let repo = Repository::default();
        let args = vec![CacheArg::Unserializable("cycle".to_string())];

        assert!(matches!(
            global_get::<_, usize>(&repo, "count_by_name", &args),
            Err(CacheError::UncacheableArgument { .. })
        ));
        assert!(global_set(&repo, "count_by_name", &args, 1usize).is_err());
        assert!(global_delete(&repo, "count_by_name", &args).is_err());
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let repo = Repository::default();

        repo.count_by_name("Blues").unwrap();

        assert!(matches!(
            global_get::<_, String>(&repo, "count_by_name", &cache_args!["Blues"]),
            Err(CacheError::StoreTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_context_local_ops_require_context() {
        let repo = Repository::default();

        assert!(matches!(
            context_local_get::<_, usize>(&repo, "local_count", &[]),
            Err(CacheError::NoActiveContext { .. })
        ));
        assert!(context_local_clear(&repo, "local_count").is_err());
        assert!(context_local_methods(&repo).is_err());
    }

    #[test]
    fn test_context_local_ops_in_scope() {
        let context = RequestContext::new();
        let repo = Repository::default();

        context.clone().sync_scope(|| {
            context_local_set(&repo, "local_count", &cache_args!["Blues"], 7usize).unwrap();
            assert_eq!(repo.local_count("Blues").unwrap(), 7);
            assert_eq!(repo.calls(), 0);

            context_local_delete(&repo, "local_count", &cache_args!["Blues"]).unwrap();
            assert_eq!(repo.local_count("Blues").unwrap(), 100);

            assert_eq!(
                context_local_keys(&repo, "local_count").unwrap(),
                vec![CacheKey::from("\"Blues\"")]
            );
            assert!(context_local_methods(&repo).unwrap().contains("local_count"));

            context_local_clear(&repo, "local_count").unwrap();
            assert!(context_local_keys(&repo, "local_count").unwrap().is_empty());
        });

        // The same handle, used explicitly, sees what the scope left behind.
        assert!(methods_in(&context, &repo).contains("local_count"));
        assert!(global_methods(&repo).is_empty());
    }

    #[test]
    fn test_context_local_values_stay_in_their_context() {
        let repo = Repository::default();
        let first = RequestContext::new();
        let second = RequestContext::new();

        set_in(&first, &repo, "local_count", &cache_args!["Blues"], 1usize).unwrap();

        assert_eq!(
            get_in::<_, _, usize>(&first, &repo, "local_count", &cache_args!["Blues"]).unwrap(),
            Some(1)
        );
        assert_eq!(
            get_in::<_, _, usize>(&second, &repo, "local_count", &cache_args!["Blues"]).unwrap(),
            None
        );
    }
}
