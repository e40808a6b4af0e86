//! Storage traits for auth-related data.

pub mod user;

pub use user::{User, UserBuilder, UserStorage, normalize_email};
