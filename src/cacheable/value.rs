//! Cacheable return values.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// A method result that can be stored in a cache.
///
/// `is_undefined` marks results that stand for "nothing was produced"; those
/// are only cached when `cache_undefined` is on. Implement it with an empty
/// body for your own types:
///
/// ```
/// use cacheable::CacheValue;
///
/// #[derive(Clone)]
/// struct Rate(f64);
///
/// impl CacheValue for Rate {}
/// ```
pub trait CacheValue: Clone + Send + 'static {
    fn is_undefined(&self) -> bool {
        false
    }
}

macro_rules! impl_cache_value {
    ($($ty:ty),* $(,)?) => {
        $(impl CacheValue for $ty {})*
    };
}

impl_cache_value!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
    serde_json::Value,
);

/// A method with no return value produced nothing.
impl CacheValue for () {
    fn is_undefined(&self) -> bool {
        true
    }
}

impl<T: Clone + Send + 'static> CacheValue for Option<T> {
    fn is_undefined(&self) -> bool {
        self.is_none()
    }
}

impl<T: Clone + Send + 'static> CacheValue for Vec<T> {}
impl<T: Clone + Send + 'static> CacheValue for VecDeque<T> {}
impl<T: Clone + Send + 'static> CacheValue for Box<T> {}
impl<T: Send + Sync + ?Sized + 'static> CacheValue for Arc<T> {}
impl<K: Clone + Send + 'static, V: Clone + Send + 'static, S: Clone + Send + 'static> CacheValue
    for HashMap<K, V, S>
{
}
impl<K: Clone + Send + 'static, V: Clone + Send + 'static> CacheValue for BTreeMap<K, V> {}
impl<T: Clone + Send + 'static, S: Clone + Send + 'static> CacheValue for HashSet<T, S> {}
impl<T: Clone + Send + 'static> CacheValue for BTreeSet<T> {}
impl<A: Clone + Send + 'static, B: Clone + Send + 'static> CacheValue for (A, B) {}
impl<A: Clone + Send + 'static, B: Clone + Send + 'static, C: Clone + Send + 'static> CacheValue
    for (A, B, C)
{
}
