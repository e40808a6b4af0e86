//! Project and milestone admin handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use portal_auth::AdminAuth;
use portal_storage::{MilestoneInput, ProjectInput};
use serde::Deserialize;
use serde_json::json;

use super::{invalidate_clients, project_client};
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    pub client_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MilestoneListParams {
    pub project_id: Option<String>,
}

// =============================================================================
// Projects
// =============================================================================

/// GET /admin/projects - Newest first, optionally for one client.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state
        .storage
        .list_projects(params.client_id.as_deref())
        .await?;
    Ok(Json(projects))
}

/// GET /admin/projects/{id}
pub async fn read_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .storage
        .get_project(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("project not found: {id}")))?;
    Ok(Json(project))
}

/// POST /admin/projects
pub async fn create_project(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<ProjectInput>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.storage.create_project(input).await?;
    state.client_data.invalidate_client(&project.client_id);

    tracing::info!(project_id = %project.id, client_id = %project.client_id, "Project created");
    state
        .activity
        .record(
            &admin.email,
            "create",
            "project",
            Some(&project.id),
            Some(json!({ "name": project.name, "client_id": project.client_id })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /admin/projects/{id}
///
/// Moving a project to another client refreshes both clients' data.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<ProjectInput>,
) -> Result<impl IntoResponse, ApiError> {
    let previous_client = project_client(&state, &id).await?;
    let project = state.storage.update_project(&id, input).await?;
    invalidate_clients(&state, &[&previous_client, &project.client_id]);

    tracing::info!(project_id = %id, status = ?project.status, "Project updated");
    state
        .activity
        .record(
            &admin.email,
            "update",
            "project",
            Some(&id),
            Some(json!({ "status": project.status })),
        )
        .await;

    Ok(Json(project))
}

/// DELETE /admin/projects/{id}
///
/// Deletes the project's milestones and detaches its resources.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = project_client(&state, &id).await?;
    state.storage.delete_project(&id).await?;
    state.client_data.invalidate_client(&client_id);

    tracing::info!(project_id = %id, "Project deleted");
    state
        .activity
        .record(&admin.email, "delete", "project", Some(&id), None)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Milestones
// =============================================================================

/// GET /admin/milestones?project_id=
pub async fn list_milestones(
    State(state): State<AppState>,
    Query(params): Query<MilestoneListParams>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let project_id = params
        .project_id
        .ok_or_else(|| ApiError::bad_request("project_id query parameter is required"))?;
    Ok(Json(state.storage.list_milestones(&project_id).await?))
}

/// GET /admin/milestones/{id}
pub async fn read_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let milestone = state
        .storage
        .get_milestone(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("milestone not found: {id}")))?;
    Ok(Json(milestone))
}

/// POST /admin/milestones
pub async fn create_milestone(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<MilestoneInput>,
) -> Result<impl IntoResponse, ApiError> {
    let milestone = state.storage.create_milestone(input).await?;
    let client_id = project_client(&state, &milestone.project_id).await?;
    state.client_data.invalidate_client(&client_id);

    state
        .activity
        .record(
            &admin.email,
            "create",
            "milestone",
            Some(&milestone.id),
            Some(json!({ "title": milestone.title, "project_id": milestone.project_id })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(milestone)))
}

/// PUT /admin/milestones/{id}
pub async fn update_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
    Json(input): Json<MilestoneInput>,
) -> Result<impl IntoResponse, ApiError> {
    let previous = state
        .storage
        .get_milestone(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("milestone not found: {id}")))?;
    let previous_client = project_client(&state, &previous.project_id).await?;

    let milestone = state.storage.update_milestone(&id, input).await?;
    let client_id = project_client(&state, &milestone.project_id).await?;
    invalidate_clients(&state, &[&previous_client, &client_id]);

    state
        .activity
        .record(
            &admin.email,
            "update",
            "milestone",
            Some(&id),
            Some(json!({ "completed": milestone.completed })),
        )
        .await;

    Ok(Json(milestone))
}

/// DELETE /admin/milestones/{id}
pub async fn delete_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let milestone = state
        .storage
        .get_milestone(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("milestone not found: {id}")))?;
    let client_id = project_client(&state, &milestone.project_id).await?;

    state.storage.delete_milestone(&id).await?;
    state.client_data.invalidate_client(&client_id);

    state
        .activity
        .record(&admin.email, "delete", "milestone", Some(&id), None)
        .await;

    Ok(StatusCode::NO_CONTENT)
}
