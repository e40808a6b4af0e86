//! Caching for read-heavy client data.

pub mod response;

pub use response::{CacheStats, CachedEntry, ResponseCache};
