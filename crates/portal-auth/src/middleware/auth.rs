//! Session extractors.
//!
//! The route gate stores the verified [`Credential`] in request extensions
//! for protected paths. These extractors read it back, or verify the session
//! cookie themselves on routes the gate treats as public.
//!
//! # Example
//!
//! ```ignore
//! use portal_auth::middleware::{AdminAuth, SessionAuth};
//!
//! async fn whoami(SessionAuth(credential): SessionAuth) -> String {
//!     credential.email
//! }
//!
//! async fn admin_only(admin: AdminAuth) -> String {
//!     format!("hello {}", admin.0.email)
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::config::{AuthConfig, ConfigError};
use crate::cookie::token_from_headers;
use crate::error::AuthError;
use crate::gate::RouteGate;
use crate::storage::{User, UserStorage};
use crate::token::{Credential, Role, SessionTokenService};

// =============================================================================
// Auth State
// =============================================================================

/// Callback invoked after a successful login.
///
/// Lets the server record activity without this crate depending on the
/// activity store.
pub type LoginCallback = Arc<dyn Fn(&User) + Send + Sync>;

/// State required by the gate, the extractors and the login handlers.
///
/// Include it in the application state and expose it via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Token issuing/verification.
    pub tokens: Arc<SessionTokenService>,

    /// Path classification and access decisions.
    pub gate: Arc<RouteGate>,

    /// User lookup for login.
    pub users: Arc<dyn UserStorage>,

    /// Auth configuration (cookie attributes, routes).
    pub config: Arc<AuthConfig>,

    /// Optional hook run after each successful login.
    pub on_login: Option<LoginCallback>,
}

impl AuthState {
    /// Creates auth state from configuration.
    ///
    /// # Errors
    /// Fails if the configuration does not yield a usable signing secret.
    pub fn new(config: AuthConfig, users: Arc<dyn UserStorage>) -> Result<Self, ConfigError> {
        let tokens = Arc::new(SessionTokenService::from_config(&config)?);
        let gate = Arc::new(RouteGate::new(config.routes.clone(), tokens.clone()));
        Ok(Self {
            tokens,
            gate,
            users,
            config: Arc::new(config),
            on_login: None,
        })
    }

    /// Sets the callback invoked after a successful login.
    #[must_use]
    pub fn with_login_callback(mut self, callback: LoginCallback) -> Self {
        self.on_login = Some(callback);
        self
    }

    /// Resolves the session credential for a request.
    fn credential_from_parts(&self, parts: &Parts) -> Option<Credential> {
        if let Some(credential) = parts.extensions.get::<Credential>() {
            return Some(credential.clone());
        }
        let token = token_from_headers(&parts.headers, &self.config.cookie.name)?;
        self.tokens.verify(&token).into_credential()
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Requires a valid session.
pub struct SessionAuth(pub Credential);

impl<S> FromRequestParts<S> for SessionAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        auth_state
            .credential_from_parts(parts)
            .map(SessionAuth)
            .ok_or_else(|| AuthError::unauthorized("Authentication required"))
    }
}

/// Resolves the session if there is one; never rejects.
pub struct OptionalSession(pub Option<Credential>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        Ok(OptionalSession(auth_state.credential_from_parts(parts)))
    }
}

/// Requires a valid session with the admin role.
///
/// The gate already enforces this for admin paths; handlers mounted
/// elsewhere use this extractor to get the same guarantee.
pub struct AdminAuth(pub Credential);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionAuth(credential) = SessionAuth::from_request_parts(parts, state).await?;

        match credential.role {
            Role::Admin => Ok(AdminAuth(credential)),
            Role::Client => {
                tracing::debug!(subject = %credential.sub, "Admin access denied");
                Err(AuthError::forbidden("Admin access required"))
            }
        }
    }
}
