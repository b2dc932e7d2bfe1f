//! Expiry Sweep Task

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::GlobalRegistry;

/// Spawns a task that purges expired entries from `registry` every
/// `sweep_interval_secs` seconds.
///
/// Stores also purge on write and evict on read; the sweep only matters for
/// stores that stop being written. Abort the returned handle to stop it.
///
/// ```ignore
/// let sweeper = spawn_sweep_task(GlobalRegistry::instance(), 60);
/// // During shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweep_task(registry: &'static GlobalRegistry, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.purge_expired();
            if removed > 0 {
                info!(removed, owners = registry.owner_count(), "expiry sweep purged entries");
            } else {
                debug!("expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CacheIdentity, CacheOwner, CacheRegistry};

    #[derive(Default)]
    struct Owner {
        identity: CacheIdentity,
    }

    impl CacheOwner for Owner {
        fn cache_identity(&self) -> &CacheIdentity {
            &self.identity
        }
    }

    fn leaked_registry() -> &'static GlobalRegistry {
        Box::leak(Box::new(GlobalRegistry::new()))
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let registry = leaked_registry();
        let owner = Owner::default();
        let store = registry.get_or_init::<Owner, u32>(&owner, "rate").unwrap();
        store
            .lock()
            .set("EUR".into(), 1, Some(Duration::from_millis(100)));

        let handle = spawn_sweep_task(registry, 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.lock().len(), 0, "expired entry should have been swept");
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_live_entries() {
        let registry = leaked_registry();
        let owner = Owner::default();
        let store = registry.get_or_init::<Owner, u32>(&owner, "rate").unwrap();
        store.lock().set("EUR".into(), 1, Some(Duration::from_secs(3600)));
        store.lock().set("USD".into(), 2, None);

        let handle = spawn_sweep_task(registry, 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.lock().len(), 2);
        assert_eq!(store.lock().get(&"USD".into()), Some(2));
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let handle = spawn_sweep_task(leaked_registry(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
