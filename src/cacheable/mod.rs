//! Cacheable Module
//!
//! The per-method interception wrapper and its configuration.

mod options;
mod value;
mod wrapper;

pub use options::{CacheableOptions, PropertyKind};
pub use value::CacheValue;
pub use wrapper::Cacheable;
