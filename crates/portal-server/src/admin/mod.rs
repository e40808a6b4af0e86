//! Admin area endpoints.
//!
//! Every route sits under the configured admin prefix (default `/admin`),
//! which the route gate already restricts to admin sessions. Handlers still
//! take the `AdminAuth` extractor for the actor's identity.
//!
//! # Endpoints
//!
//! - `GET /admin`, `GET /admin/dashboard` - Summary counts and recent activity
//! - `GET|POST /admin/clients`, `GET|PUT|DELETE /admin/clients/{id}`
//! - `GET|POST /admin/projects`, `GET|PUT|DELETE /admin/projects/{id}`
//! - `GET|POST /admin/milestones`, `GET|PUT|DELETE /admin/milestones/{id}`
//! - `GET|POST /admin/resources`, `GET|PUT|DELETE /admin/resources/{id}`
//! - `GET|POST /admin/users`, `GET|PUT|DELETE /admin/users/{id}`
//! - `POST /admin/notifications` - Notify a client
//! - `GET /admin/activity` - Recent activity
//! - `GET /admin/cache`, `DELETE /admin/cache`, `POST /admin/cache/invalidate` - Response cache

pub mod clients;
pub mod dashboard;
pub mod projects;
pub mod resources;
pub mod users;

use axum::Router;
use axum::routing::{get, post};

use crate::error::ApiError;
use crate::server::AppState;

/// Creates the admin routes under `prefix`.
pub fn admin_routes(prefix: &str) -> Router<AppState> {
    let prefix = prefix.trim_end_matches('/');
    let path = |suffix: &str| format!("{prefix}{suffix}");

    Router::new()
        .route(prefix, get(dashboard::dashboard))
        .route(&path("/dashboard"), get(dashboard::dashboard))
        // Clients
        .route(
            &path("/clients"),
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            &path("/clients/{id}"),
            get(clients::read_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        // Projects and milestones
        .route(
            &path("/projects"),
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            &path("/projects/{id}"),
            get(projects::read_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            &path("/milestones"),
            get(projects::list_milestones).post(projects::create_milestone),
        )
        .route(
            &path("/milestones/{id}"),
            get(projects::read_milestone)
                .put(projects::update_milestone)
                .delete(projects::delete_milestone),
        )
        // Resources and notifications
        .route(
            &path("/resources"),
            get(resources::list_resources).post(resources::create_resource),
        )
        .route(
            &path("/resources/{id}"),
            get(resources::read_resource)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        )
        .route(
            &path("/notifications"),
            post(resources::create_notification),
        )
        // Users
        .route(
            &path("/users"),
            get(users::list_users).post(users::create_user),
        )
        .route(
            &path("/users/{id}"),
            get(users::read_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Activity and cache
        .route(&path("/activity"), get(dashboard::list_activity))
        .route(
            &path("/cache"),
            get(dashboard::cache_stats).delete(dashboard::clear_cache),
        )
        .route(&path("/cache/invalidate"), post(dashboard::invalidate_cache))
}

/// Client that owns a project.
async fn project_client(state: &AppState, project_id: &str) -> Result<String, ApiError> {
    state
        .storage
        .get_project(project_id)
        .await?
        .map(|project| project.client_id)
        .ok_or_else(|| ApiError::not_found(format!("project not found: {project_id}")))
}

/// Drops cached reads for each distinct client.
fn invalidate_clients(state: &AppState, client_ids: &[&str]) {
    for (i, client_id) in client_ids.iter().enumerate() {
        if !client_ids[..i].contains(client_id) {
            state.client_data.invalidate_client(client_id);
        }
    }
}
