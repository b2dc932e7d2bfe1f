//! Cache Module
//!
//! Provides the expiring key-value store that backs every cached method.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::ExpiringMap;
