use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use portal_auth::OptionalSession;
use serde::Serialize;
use serde_json::json;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Client Portal",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.storage.list_clients().await {
        Ok(_) => (StatusCode::OK, Json(HealthResponse { status: "ready" })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}

// ---- Pages ----

/// `GET <admin_login>`
pub async fn admin_login_page(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
) -> impl IntoResponse {
    let routes = state.auth.gate.routes();
    Json(json!({
        "page": "admin-login",
        "action": routes.admin_login,
        "authenticated": session.is_some(),
        "next": routes.admin_prefix,
    }))
}

/// `GET <portal_login>`
pub async fn portal_login_page(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
) -> impl IntoResponse {
    let routes = state.auth.gate.routes();
    Json(json!({
        "page": "portal-login",
        "action": routes.portal_login,
        "authenticated": session.is_some(),
        "next": routes.portal_prefix,
    }))
}

/// `GET <unauthorized>`: target of role mismatches at the gate.
pub async fn unauthorized_page(OptionalSession(session): OptionalSession) -> impl IntoResponse {
    let body = json!({
        "page": "unauthorized",
        "message": "You do not have access to this area",
        "role": session.map(|c| c.role),
    });
    (StatusCode::FORBIDDEN, Json(body))
}
