//! Client admin handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use portal_auth::AdminAuth;
use portal_storage::ClientInput;
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;

/// GET /admin/clients - All clients by name.
pub async fn list_clients(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.storage.list_clients().await?))
}

/// GET /admin/clients/{id}
pub async fn read_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let client = state
        .storage
        .get_client(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("client not found: {id}")))?;
    Ok(Json(client))
}

/// POST /admin/clients
pub async fn create_client(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<ClientInput>,
) -> Result<impl IntoResponse, ApiError> {
    let client = state.storage.create_client(input).await?;

    tracing::info!(client_id = %client.id, admin = %admin.email, "Client created");
    state
        .activity
        .record(
            &admin.email,
            "create",
            "client",
            Some(&client.id),
            Some(json!({ "name": client.name })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /admin/clients/{id}
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<ClientInput>,
) -> Result<impl IntoResponse, ApiError> {
    let client = state.storage.update_client(&id, input).await?;
    state.client_data.invalidate_client(&id);

    tracing::info!(client_id = %id, admin = %admin.email, "Client updated");
    state
        .activity
        .record(&admin.email, "update", "client", Some(&id), None)
        .await;

    Ok(Json(client))
}

/// DELETE /admin/clients/{id}
///
/// Also removes the client's projects, milestones, resources and
/// notifications.
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    state.storage.delete_client(&id).await?;
    state.client_data.invalidate_client(&id);

    tracing::info!(client_id = %id, admin = %admin.email, "Client deleted");
    state
        .activity
        .record(&admin.email, "delete", "client", Some(&id), None)
        .await;

    Ok(StatusCode::NO_CONTENT)
}
