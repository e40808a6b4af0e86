//! Session token service.
//!
//! - [`credential`] - `Credential` claims, `Role` and the `Verification` result
//! - [`service`] - `SessionTokenService` issuing and verifying HS256 tokens

pub mod credential;
pub mod service;

pub use credential::{Credential, Role, UnknownRole, Verification};
pub use service::SessionTokenService;
