//! Call Arguments
//!
//! A `CacheArg` is one call argument reduced to what the key builder needs.
//! Conversion picks the explicit `CacheableKey` override when a type has one
//! and falls back to JSON serialization otherwise.

use serde::Serialize;
use serde_json::Value;

// == Cacheable Key ==
/// Opt-in key override for argument types that cannot, or should not, be
/// serialized (cyclic graphs, handles, very large values).
///
/// The returned string is used verbatim as the argument's key.
pub trait CacheableKey {
    fn cache_key(&self) -> String;
}

impl<T: CacheableKey + ?Sized> CacheableKey for &T {
    fn cache_key(&self) -> String {
        (**self).cache_key()
    }
}

impl<T: CacheableKey + ?Sized> CacheableKey for Box<T> {
    fn cache_key(&self) -> String {
        (**self).cache_key()
    }
}

// == Cache Arg ==
/// One argument of an intercepted call.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheArg {
    /// An argument that was not supplied
    Undefined,
    /// An argument that is present but empty (`None`, `()`)
    Null,
    /// Key produced by a `CacheableKey` implementation
    Keyed(String),
    /// Canonical JSON form of a serializable argument
    Json(Value),
    /// Serialization failed; holds the serializer's reason
    Unserializable(String),
}

impl CacheArg {
    /// Uses the argument's own `CacheableKey` implementation.
    pub fn keyed<K: CacheableKey + ?Sized>(value: &K) -> Self {
        CacheArg::Keyed(value.cache_key())
    }

    /// Serializes the argument to JSON. A value that serializes to `null`
    /// becomes `CacheArg::Null`.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Null) => CacheArg::Null,
            Ok(json) => CacheArg::Json(json),
            Err(err) => CacheArg::Unserializable(err.to_string()),
        }
    }

    /// Treats `None` as an omitted argument rather than a null one.
    pub fn optional<T: Serialize>(value: Option<&T>) -> Self {
        match value {
            Some(value) => CacheArg::serialized(value),
            None => CacheArg::Undefined,
        }
    }

    /// `optional` for types keyed through `CacheableKey`. `None` is omitted,
    /// a present value supplies its own key.
    pub fn optional_keyed<K: CacheableKey + ?Sized>(value: Option<&K>) -> Self {
        match value {
            Some(value) => CacheArg::keyed(value),
            None => CacheArg::Undefined,
        }
    }
}

// == Capability Probes ==
// Autoref-based dispatch used by `cache_args!`: each probe sits one reference
// level below the previous one, so method resolution tries them in order.
// The first level takes an explicit `CacheArg` or an `Option` of a keyed
// type, the second any `CacheableKey`, the last anything `Serialize`.

#[doc(hidden)]
pub struct ArgProbe<'a, T: ?Sized>(pub &'a T);

#[doc(hidden)]
pub trait ProbeCacheArg {
    fn to_cache_arg(&self) -> CacheArg;
}

impl ProbeCacheArg for &&ArgProbe<'_, CacheArg> {
    fn to_cache_arg(&self) -> CacheArg {
        self.0.clone()
    }
}

#[doc(hidden)]
pub trait ProbeOptionalKey {
    fn to_cache_arg(&self) -> CacheArg;
}

/// `None` is a null argument, as it is for serialized options.
impl<T: CacheableKey> ProbeOptionalKey for &&ArgProbe<'_, Option<T>> {
    fn to_cache_arg(&self) -> CacheArg {
        match self.0 {
            Some(value) => CacheArg::keyed(value),
            None => CacheArg::Null,
        }
    }
}

#[doc(hidden)]
pub trait ProbeCacheableKey {
    fn to_cache_arg(&self) -> CacheArg;
}

impl<T: CacheableKey + ?Sized> ProbeCacheableKey for &ArgProbe<'_, T> {
    fn to_cache_arg(&self) -> CacheArg {
        CacheArg::keyed(self.0)
    }
}

#[doc(hidden)]
pub trait ProbeSerialize {
    fn to_cache_arg(&self) -> CacheArg;
}

impl<T: Serialize + ?Sized> ProbeSerialize for ArgProbe<'_, T> {
    fn to_cache_arg(&self) -> CacheArg {
        CacheArg::serialized(self.0)
    }
}

/// Builds a `Vec<CacheArg>` from call arguments.
///
/// Each argument is converted with the first capability it has: a `CacheArg`
/// is taken as-is, a `CacheableKey` supplies its own key, anything else is
/// serialized with serde. An `Option` of a `CacheableKey` type maps `None` to
/// `CacheArg::Null` and keys a present value through its override.
///
/// ```
/// use cacheable::{cache_args, CacheArg, CacheableKey};
///
/// struct Account(u64);
///
/// impl CacheableKey for Account {
///     fn cache_key(&self) -> String {
///         format!("account:{}", self.0)
///     }
/// }
///
/// let args = cache_args![Account(7), "eur", CacheArg::Undefined];
/// assert_eq!(args[0], CacheArg::Keyed("account:7".to_string()));
/// assert_eq!(args[1], CacheArg::Json(serde_json::json!("eur")));
/// assert_eq!(args[2], CacheArg::Undefined);
/// ```
#[macro_export]
macro_rules! cache_args {
    () => {
        ::std::vec::Vec::<$crate::key::CacheArg>::new()
    };
    ($($arg:expr),+ $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::key::{
            ProbeCacheArg as _, ProbeCacheableKey as _, ProbeOptionalKey as _, ProbeSerialize as _,
        };
        ::std::vec![$((&&&$crate::key::ArgProbe(&$arg)).to_cache_arg()),+]
    }};
}
