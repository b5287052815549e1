//! Cache Module
//!
//! Provides the concurrent entry store with TTL expiration.

mod entry;
mod store;


use std::any::Any;
use std::sync::Arc;

// Re-export public types
pub use entry::{current_timestamp_ms, Entry};
pub use store::Store;

pub(crate) use entry::duration_ms;

/// An opaque stored value. The store never inspects its concrete type.
pub type Value = Arc<dyn Any + Send + Sync>;
