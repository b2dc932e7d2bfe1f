//! Cache Key Builder
//!
//! Turns the argument list of a call into a single deterministic key.

use std::fmt;

use crate::error::{CacheError, Result};
use crate::key::CacheArg;

/// Joins per-argument keys of a multi-argument call.
///
/// Not escaped: an argument whose key contains `_` can collide with a
/// different split of the same text.
pub const KEY_SEPARATOR: &str = "_";

// == Cache Key ==
/// Key of one cached call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// The call had no arguments
    NoArgs,
    /// Single argument that was null
    NullValue,
    /// Single argument that was omitted
    UndefinedValue,
    /// Serialized or overridden key, possibly joined from several arguments
    Text(String),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::NoArgs => f.write_str("__no_args__"),
            CacheKey::NullValue => f.write_str("null"),
            CacheKey::UndefinedValue => f.write_str("undefined"),
            CacheKey::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(text: &str) -> Self {
        CacheKey::Text(text.to_string())
    }
}

// == Build Key ==
/// Derives the cache key for `args`.
///
/// `identity` (`Type::method`) only appears in error messages.
///
/// # Errors
/// `CacheError::UncacheableArgument` for the first argument that could not be
/// serialized, carrying its 0-based index.
pub fn build_key(args: &[CacheArg], identity: &str) -> Result<CacheKey> {
    if args.is_empty() {
        return Ok(CacheKey::NoArgs);
    }

    let mut parts = args
        .iter()
        .enumerate()
        .map(|(index, arg)| argument_key(arg, index, identity))
        .collect::<Result<Vec<_>>>()?;

    if parts.len() == 1 {
        return Ok(parts.swap_remove(0));
    }

    let joined = parts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR);
    Ok(CacheKey::Text(joined))
}

fn argument_key(arg: &CacheArg, index: usize, identity: &str) -> Result<CacheKey> {
    match arg {
        CacheArg::Undefined => Ok(CacheKey::UndefinedValue),
        CacheArg::Null => Ok(CacheKey::NullValue),
        CacheArg::Keyed(key) => Ok(CacheKey::Text(key.clone())),
        CacheArg::Json(json) => Ok(CacheKey::Text(json.to_string())),
        CacheArg::Unserializable(reason) => Err(CacheError::UncacheableArgument {
            identity: identity.to_string(),
            index,
            reason: reason.clone(),
        }),
    }
}
