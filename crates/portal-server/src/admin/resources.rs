//! Resource and notification admin handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use portal_auth::AdminAuth;
use portal_storage::{NotificationInput, ResourceInput};
use serde::Deserialize;
use serde_json::json;

use super::invalidate_clients;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResourceListParams {
    pub client_id: Option<String>,
}

/// GET /admin/resources - Optionally for one client.
pub async fn list_resources(
    State(state): State<AppState>,
    Query(params): Query<ResourceListParams>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let resources = state
        .storage
        .list_resources(params.client_id.as_deref())
        .await?;
    Ok(Json(resources))
}

/// GET /admin/resources/{id}
pub async fn read_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let resource = state
        .storage
        .get_resource(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("resource not found: {id}")))?;
    Ok(Json(resource))
}

/// POST /admin/resources
pub async fn create_resource(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<ResourceInput>,
) -> Result<impl IntoResponse, ApiError> {
    let resource = state.storage.create_resource(input).await?;
    state.client_data.invalidate_client(&resource.client_id);

    state
        .activity
        .record(
            &admin.email,
            "create",
            "resource",
            Some(&resource.id),
            Some(json!({ "title": resource.title, "client_id": resource.client_id })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(resource)))
}

/// PUT /admin/resources/{id}
pub async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<ResourceInput>,
) -> Result<impl IntoResponse, ApiError> {
    let previous = state
        .storage
        .get_resource(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("resource not found: {id}")))?;

    let resource = state.storage.update_resource(&id, input).await?;
    invalidate_clients(&state, &[&previous.client_id, &resource.client_id]);

    state
        .activity
        .record(&admin.email, "update", "resource", Some(&id), None)
        .await;

    Ok(Json(resource))
}

/// DELETE /admin/resources/{id}
pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let resource = state
        .storage
        .get_resource(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("resource not found: {id}")))?;

    state.storage.delete_resource(&id).await?;
    state.client_data.invalidate_client(&resource.client_id);

    state
        .activity
        .record(&admin.email, "delete", "resource", Some(&id), None)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/notifications - Sends a notification to a client.
pub async fn create_notification(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<NotificationInput>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state.storage.create_notification(input).await?;
    state.client_data.invalidate_client(&notification.client_id);

    tracing::info!(
        notification_id = %notification.id,
        client_id = %notification.client_id,
        "Notification sent"
    );
    state
        .activity
        .record(
            &admin.email,
            "notify",
            "client",
            Some(&notification.client_id),
            Some(json!({ "title": notification.title })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(notification)))
}
