//! Cacheable - method-level memoization
//!
//! Caches the results of methods keyed by their arguments, either per owning
//! instance for the instance's lifetime (`Scope::Global`) or per logical
//! request (`Scope::ContextLocal`). Entries can expire after a TTL, results
//! that are "undefined" can be left uncached, and the caches can be read,
//! seeded and invalidated directly through the `ops` functions.
//!
//! ```
//! use cacheable::{cache_args, CacheIdentity, CacheOwner, Cacheable};
//!
//! #[derive(Default)]
//! struct PetRepository {
//!     identity: CacheIdentity,
//! }
//!
//! impl CacheOwner for PetRepository {
//!     fn cache_identity(&self) -> &CacheIdentity {
//!         &self.identity
//!     }
//! }
//!
//! impl PetRepository {
//!     const FIND: Cacheable = Cacheable::method("find");
//!
//!     fn find(&self, name: &str) -> cacheable::Result<String> {
//!         Self::FIND.call(self, &cache_args![name], || name.to_uppercase())
//!     }
//! }
//!
//! let pets = PetRepository::default();
//! assert_eq!(pets.find("blues").unwrap(), "BLUES");
//! assert_eq!(cacheable::global_keys(&pets, "find").len(), 1);
//! ```

pub mod api;
pub mod cache;
pub mod cacheable;
pub mod config;
pub mod error;
pub mod key;
pub mod models;
pub mod ops;
pub mod registry;
pub mod tasks;

pub use crate::cacheable::{CacheValue, Cacheable, CacheableOptions, PropertyKind};
pub use config::Config;
pub use error::{CacheError, Result};
pub use key::{build_key, CacheArg, CacheKey, CacheableKey};
pub use ops::{
    context_local_clear, context_local_delete, context_local_get, context_local_keys,
    context_local_methods, context_local_set, global_clear, global_delete, global_get,
    global_keys, global_methods, global_set,
};
pub use registry::{CacheIdentity, CacheOwner, GlobalRegistry, RequestContext, Scope};
pub use tasks::spawn_sweep_task;
