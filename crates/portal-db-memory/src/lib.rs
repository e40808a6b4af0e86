//! In-memory storage backend for the client portal.
//!
//! This crate provides an in-memory implementation of every storage trait
//! from `portal-storage`, plus `portal_auth::UserStorage`, using papaya
//! lock-free HashMaps for concurrent access. Data does not survive a
//! restart.
//!
//! # Example
//!
//! ```ignore
//! use portal_db_memory::InMemoryStorage;
//! use portal_storage::{ClientInput, ClientStorage};
//!
//! let storage = InMemoryStorage::new();
//! let client = storage
//!     .create_client(ClientInput { name: "Acme".into(), ..Default::default() })
//!     .await?;
//! ```

mod portal_impl;
mod storage;
mod user_impl;

pub use storage::{DEFAULT_ACTIVITY_CAPACITY, InMemoryStorage};

/// Creates a new shareable in-memory storage instance.
pub fn create_storage() -> std::sync::Arc<InMemoryStorage> {
    std::sync::Arc::new(InMemoryStorage::new())
}
