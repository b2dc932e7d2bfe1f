//! Request Contexts
//!
//! A `RequestContext` owns the context-local caches of one logical unit of
//! work, typically one inbound request. It becomes the active context for a
//! future through `scope`, and follows that future across every `.await`.
//! Tasks spawned from inside do not inherit it unless started through
//! `RequestContext::spawn`.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::registry::{
    method_identity, CacheOwner, CacheRegistry, ErasedStore, SharedStore, StoreDirectory,
};

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static ACTIVE_CONTEXTS: ActiveContexts;
}

/// Contexts active for the current task, one per namespace.
#[derive(Clone, Default)]
struct ActiveContexts(Arc<HashMap<String, RequestContext>>);

impl ActiveContexts {
    fn current() -> Self {
        ACTIVE_CONTEXTS
            .try_with(Clone::clone)
            .unwrap_or_default()
    }

    fn with(mut self, context: RequestContext) -> Self {
        Arc::make_mut(&mut self.0).insert(context.namespace().to_string(), context);
        self
    }
}

// == Request Context ==
/// Handle to one context's cache registry. Clones share the same caches.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    id: u64,
    namespace: String,
    /// Keyed by owner type: instances of one type share context-local caches
    directories: Mutex<HashMap<TypeId, StoreDirectory>>,
}

impl RequestContext {
    /// Creates a context in the configured namespace.
    pub fn new() -> Self {
        Self::in_namespace(&Config::global().namespace)
    }

    pub fn in_namespace(namespace: &str) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                id: NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed),
                namespace: namespace.to_string(),
                directories: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// The active context in the configured namespace.
    ///
    /// # Errors
    /// `NoActiveContext` when called outside of any `scope`.
    pub fn current() -> Result<Self> {
        Self::current_in(&Config::global().namespace)
    }

    pub fn current_in(namespace: &str) -> Result<Self> {
        ActiveContexts::current()
            .0
            .get(namespace)
            .cloned()
            .ok_or_else(|| CacheError::NoActiveContext {
                namespace: namespace.to_string(),
            })
    }

    /// Runs `future` with this context active. Contexts of other namespaces
    /// that were already active stay active.
    pub async fn scope<F: Future>(self, future: F) -> F::Output {
        let active = ActiveContexts::current().with(self);
        ACTIVE_CONTEXTS.scope(active, future).await
    }

    /// Synchronous counterpart of `scope`.
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        let active = ActiveContexts::current().with(self);
        ACTIVE_CONTEXTS.sync_scope(active, f)
    }

    /// Spawns a tokio task that runs with this context active.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::spawn(self.clone().scope(future))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.inner.id)
            .field("namespace", &self.inner.namespace)
            .finish()
    }
}

impl CacheRegistry for RequestContext {
    fn get_or_init<O, V>(&self, _owner: &O, method: &str) -> Result<SharedStore<V>>
    where
        O: CacheOwner,
        V: Clone + Send + 'static,
    {
        let identity = method_identity::<O>(method);
        let mut directories = self.inner.directories.lock();
        let directory = directories.entry(TypeId::of::<O>()).or_insert_with(|| {
            debug!(context = self.inner.id, identity = %identity, "creating context directory");
            StoreDirectory::default()
        });
        directory.get_or_init(method, &identity)
    }

    fn lookup<O: CacheOwner>(&self, _owner: &O, method: &str) -> Option<Arc<dyn ErasedStore>> {
        self.inner
            .directories
            .lock()
            .get(&TypeId::of::<O>())
            .and_then(|directory| directory.lookup(method))
    }

    fn methods<O: CacheOwner>(&self, _owner: &O) -> BTreeSet<String> {
        self.inner
            .directories
            .lock()
            .get(&TypeId::of::<O>())
            .map(StoreDirectory::methods)
            .unwrap_or_default()
    }
}
