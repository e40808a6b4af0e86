//! Client portal endpoints.
//!
//! Reads go through [`ClientDataService`](crate::services::ClientDataService)
//! and are served from the response cache when fresh. The client whose data
//! is shown comes from the session: client users see their own client, admin
//! users pick one with `?client_id=`.

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    response::IntoResponse,
    routing::{get, post},
};
use portal_auth::{Credential, Role, SessionAuth};
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::AppState;

/// Creates the portal routes under `prefix`.
pub fn portal_routes(prefix: &str) -> Router<AppState> {
    let prefix = prefix.trim_end_matches('/');
    let path = |suffix: &str| format!("{prefix}{suffix}");

    Router::new()
        .route(prefix, get(dashboard))
        .route(&path("/dashboard"), get(dashboard))
        .route(&path("/projects"), get(projects))
        .route(&path("/resources"), get(resources))
        .route(&path("/milestones"), get(milestones))
        .route(&path("/notifications"), get(notifications))
        .route(&path("/notifications/{id}/read"), post(mark_notification_read))
}

#[derive(Debug, Deserialize)]
struct ClientParams {
    client_id: Option<String>,
}

/// The client a portal request acts for.
#[derive(Debug, Clone)]
pub struct PortalClient {
    pub client_id: String,
    pub credential: Credential,
}

impl FromRequestParts<AppState> for PortalClient {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionAuth(credential) = SessionAuth::from_request_parts(parts, state).await?;

        let client_id = match credential.role {
            Role::Client => {
                let user = state
                    .users
                    .find_by_id(&credential.sub)
                    .await?
                    .filter(|user| user.is_active())
                    .ok_or_else(|| ApiError::forbidden("Account is no longer active"))?;
                user.client_id
                    .ok_or_else(|| ApiError::forbidden("No client is linked to this account"))?
            }
            Role::Admin => {
                let Query(params) = Query::<ClientParams>::from_request_parts(parts, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                params.client_id.filter(|id| !id.is_empty()).ok_or_else(|| {
                    ApiError::bad_request("client_id query parameter is required for admins")
                })?
            }
        };

        Ok(PortalClient {
            client_id,
            credential,
        })
    }
}

/// GET /portal, GET /portal/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    client: PortalClient,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.client_data.client_data(&client.client_id).await?))
}

/// GET /portal/projects
pub async fn projects(
    State(state): State<AppState>,
    client: PortalClient,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.client_data.projects(&client.client_id).await?))
}

/// GET /portal/resources
pub async fn resources(
    State(state): State<AppState>,
    client: PortalClient,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.client_data.resources(&client.client_id).await?))
}

/// GET /portal/milestones
pub async fn milestones(
    State(state): State<AppState>,
    client: PortalClient,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.client_data.milestones(&client.client_id).await?))
}

/// GET /portal/notifications
pub async fn notifications(
    State(state): State<AppState>,
    client: PortalClient,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.client_data.notifications(&client.client_id).await?,
    ))
}

/// POST /portal/notifications/{id}/read
///
/// Only the client's own notifications can be marked; others are not found.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    client: PortalClient,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state
        .storage
        .mark_notification_read(&client.client_id, &id)
        .await?;
    state.client_data.invalidate_client(&client.client_id);

    tracing::debug!(
        notification_id = %id,
        subject = %client.credential.sub,
        "Notification marked read"
    );
    Ok(Json(notification))
}
