//! Axum adapter for the route gate.
//!
//! ```ignore
//! let app = Router::new()
//!     .nest("/admin", admin_routes())
//!     .layer(axum::middleware::from_fn_with_state(auth_state.clone(), route_gate))
//!     .with_state(app_state);
//! ```

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::cookie::token_from_headers;
use crate::gate::GateDecision;

use super::auth::AuthState;

/// Runs the gate before any handler.
///
/// Allowed requests on protected paths carry the verified `Credential` in
/// their extensions. Everything else is answered with a redirect.
pub async fn route_gate(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = token_from_headers(req.headers(), &state.config.cookie.name);
    let decision = state.gate.decide(req.uri().path(), token.as_deref());

    match decision {
        GateDecision::Allowed(Some(credential)) => {
            req.extensions_mut().insert(credential);
            next.run(req).await
        }
        GateDecision::Allowed(None) => next.run(req).await,
        GateDecision::RedirectToLogin(target) | GateDecision::RedirectToUnauthorized(target) => {
            Redirect::temporary(&target).into_response()
        }
    }
}
