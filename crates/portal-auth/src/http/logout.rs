//! Logout and session introspection endpoints.
//!
//! Logout only deletes the client-held cookie. Tokens are not tracked
//! server-side, so a copied token stays valid until it expires.

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cookie::removal_cookie;
use crate::middleware::{AuthState, OptionalSession};
use crate::token::Credential;

/// `POST /auth/logout`
pub async fn logout_handler(
    State(state): State<AuthState>,
    OptionalSession(session): OptionalSession,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    if let Some(credential) = session {
        tracing::info!(subject = %credential.sub, "User logged out");
    }
    (
        jar.add(removal_cookie(&state.config)),
        Json(json!({ "success": true })),
    )
}

/// Response of `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Whether the request carries a valid session.
    pub authenticated: bool,
    /// The verified credential, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

/// `GET /auth/session`
pub async fn session_handler(OptionalSession(session): OptionalSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: session.is_some(),
        credential: session,
    })
}
