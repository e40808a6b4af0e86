//! Admin dashboard, activity feed and cache controls.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use portal_auth::AdminAuth;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::CacheStats;
use crate::error::ApiError;
use crate::server::AppState;

/// Entries shown on the dashboard.
const DASHBOARD_ACTIVITY: usize = 10;
const DEFAULT_ACTIVITY_LIMIT: usize = 50;
const MAX_ACTIVITY_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub clients: usize,
    pub projects: usize,
    pub active_projects: usize,
    pub users: usize,
    pub recent_activity: Vec<portal_storage::ActivityEntry>,
    pub cache: CacheStats,
}

/// GET /admin, GET /admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let clients = state.storage.list_clients().await?;
    let projects = state.storage.list_projects(None).await?;
    let users = state.users.list_users().await?;

    Ok(Json(DashboardSummary {
        clients: clients.len(),
        active_projects: projects.iter().filter(|p| p.status.is_active()).count(),
        projects: projects.len(),
        users: users.len(),
        recent_activity: state.storage.list_activity(DASHBOARD_ACTIVITY).await?,
        cache: state.client_data.stats(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityParams {
    pub limit: Option<usize>,
}

/// GET /admin/activity?limit= - Newest first, at most 200 entries.
pub async fn list_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);
    Ok(Json(state.storage.list_activity(limit).await?))
}

/// GET /admin/cache - Counters and stored keys.
pub async fn cache_stats(State(state): State<AppState>, _admin: AdminAuth) -> impl IntoResponse {
    let stats = state.client_data.stats();
    let mut keys = state.client_data.cache().keys();
    keys.sort();
    Json(json!({
        "hit_rate": stats.hit_rate(),
        "stats": stats,
        "keys": keys,
    }))
}

/// DELETE /admin/cache - Drops every cached read.
pub async fn clear_cache(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
) -> impl IntoResponse {
    let removed = state.client_data.clear_cache();

    state
        .activity
        .record(
            &admin.email,
            "clear",
            "cache",
            None,
            Some(json!({ "removed": removed })),
        )
        .await;

    Json(json!({ "removed": removed }))
}

#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub prefix: String,
}

/// POST /admin/cache/invalidate - Drops every key starting with `prefix`.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<InvalidateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.prefix.is_empty() {
        return Err(ApiError::bad_request("prefix must not be empty"));
    }
    let removed = state.client_data.invalidate_prefix(&request.prefix);

    state
        .activity
        .record(
            &admin.email,
            "invalidate",
            "cache",
            None,
            Some(json!({ "prefix": request.prefix, "removed": removed })),
        )
        .await;

    Ok(Json(json!({ "prefix": request.prefix, "removed": removed })))
}
