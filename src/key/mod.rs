//! Key Module
//!
//! Derives cache keys from call arguments.

mod arg;
mod builder;


pub use arg::{
    ArgProbe, CacheArg, CacheableKey, ProbeCacheArg, ProbeCacheableKey, ProbeOptionalKey,
    ProbeSerialize,
};
pub use builder::{build_key, CacheKey, KEY_SEPARATOR};
