//! HTTP middleware for authentication and authorization.
//!
//! - [`gate`] - `route_gate`, run before every handler
//! - [`auth`] - `AuthState` and the session extractors
//! - [`error`] - JSON error responses for `AuthError`

pub mod auth;
pub mod error;
pub mod gate;

pub use auth::{AdminAuth, AuthState, LoginCallback, OptionalSession, SessionAuth};
pub use gate::route_gate;
