//! Background Tasks Module
//!
//! Periodic maintenance of the global caches.
//!
//! # Tasks
//! - Expiry sweep: purges expired entries from every global store, so that
//!   caches nobody reads again still give their memory back

mod sweep;

pub use sweep::spawn_sweep_task;
