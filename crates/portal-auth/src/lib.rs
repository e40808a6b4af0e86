//! # portal-auth
//!
//! Authentication and authorization for the client portal server.
//!
//! This crate provides:
//! - Signed session tokens (HS256) carrying a user's identity and role
//! - The route gate deciding, per request path, whether to serve, redirect
//!   to a login page, or redirect to the unauthorized page
//! - The `auth-token` session cookie
//! - Password hashing and the login/logout handlers
//!
//! ## Modules
//!
//! - [`config`] - Secret, session lifetime, cookie and route configuration
//! - [`token`] - Token issuing and verification
//! - [`gate`] - Path classification and access decisions
//! - [`cookie`] - Session cookie construction and parsing
//! - [`password`] - Argon2 password hashing
//! - [`storage`] - User model and storage trait
//! - [`middleware`] - Axum gate middleware and session extractors
//! - [`http`] - Axum handlers for login, logout and session introspection

pub mod config;
pub mod cookie;
pub mod error;
pub mod gate;
pub mod http;
pub mod middleware;
pub mod password;
pub mod storage;
pub mod token;

pub use config::{AuthConfig, ConfigError, CookieConfig, RouteConfig, SessionConfig};
pub use error::AuthError;
pub use gate::{GateDecision, RouteClass, RouteGate};
pub use http::{
    LoginRequest, LoginResponse, SessionResponse, admin_login_handler, logout_handler,
    portal_login_handler, session_handler,
};
pub use middleware::{AdminAuth, AuthState, LoginCallback, OptionalSession, SessionAuth, route_gate};
pub use storage::{User, UserBuilder, UserStorage, normalize_email};
pub use token::{Credential, Role, SessionTokenService, UnknownRole, Verification};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;
