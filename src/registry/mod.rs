//! Registry Module
//!
//! Resolves the store that holds a method's cache entries. Two registries
//! exist: the global one (per owning instance, for the owner's lifetime) and
//! the context-local one (per `RequestContext`).

mod context;
mod directory;
mod global;
mod owner;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::error::{CacheError, Result};

pub use context::RequestContext;
pub use directory::{downcast_store, ErasedStore, SharedStore, Store, StoreDirectory};
pub use global::GlobalRegistry;
pub use owner::{method_identity, short_type_name, CacheIdentity, CacheOwner};

// == Scope ==
/// Which registry owns a cached method's stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One cache per owning instance, shared by every caller
    #[default]
    Global,
    /// One cache per active `RequestContext`
    ContextLocal,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "GLOBAL",
            Scope::ContextLocal => "CONTEXT_LOCAL",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = CacheError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GLOBAL" => Ok(Scope::Global),
            "CONTEXT_LOCAL" | "LOCAL_STORAGE" => Ok(Scope::ContextLocal),
            _ => Err(CacheError::UnrecognizedScope(value.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

// == Cache Registry ==
/// Lookup of per-(owner, method) stores.
pub trait CacheRegistry {
    /// Returns the store for `(owner, method)`, creating it on first use.
    fn get_or_init<O, V>(&self, owner: &O, method: &str) -> Result<SharedStore<V>>
    where
        O: CacheOwner,
        V: Clone + Send + 'static;

    /// Returns the store if it exists, without creating one.
    fn lookup<O: CacheOwner>(&self, owner: &O, method: &str) -> Option<Arc<dyn ErasedStore>>;

    /// Names of the owner's methods that have a store.
    fn methods<O: CacheOwner>(&self, owner: &O) -> BTreeSet<String>;
}

// == Scope Registry ==
/// The registry selected for a scope, resolved for the calling task.
pub enum ScopeRegistry {
    Global(&'static GlobalRegistry),
    Context(RequestContext),
}

impl ScopeRegistry {
    /// # Errors
    /// `NoActiveContext` for `Scope::ContextLocal` outside of a request context.
    pub fn for_scope(scope: Scope) -> Result<Self> {
        match scope {
            Scope::Global => Ok(ScopeRegistry::Global(GlobalRegistry::instance())),
            Scope::ContextLocal => RequestContext::current().map(ScopeRegistry::Context),
        }
    }
}

impl CacheRegistry for ScopeRegistry {
    fn get_or_init<O, V>(&self, owner: &O, method: &str) -> Result<SharedStore<V>>
    where
        O: CacheOwner,
        V: Clone + Send + 'static,
    {
        match self {
            ScopeRegistry::Global(registry) => registry.get_or_init(owner, method),
            ScopeRegistry::Context(context) => context.get_or_init(owner, method),
        }
    }

    fn lookup<O: CacheOwner>(&self, owner: &O, method: &str) -> Option<Arc<dyn ErasedStore>> {
        match self {
            ScopeRegistry::Global(registry) => registry.lookup(owner, method),
            ScopeRegistry::Context(context) => context.lookup(owner, method),
        }
    }

    fn methods<O: CacheOwner>(&self, owner: &O) -> BTreeSet<String> {
        match self {
            ScopeRegistry::Global(registry) => registry.methods(owner),
            ScopeRegistry::Context(context) => context.methods(owner),
        }
    }
}
