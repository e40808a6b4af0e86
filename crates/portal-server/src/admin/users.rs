//! User admin handlers.
//!
//! Client-role users must be linked to an existing client; admin users are
//! never linked. Passwords are hashed before storage and never returned.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use portal_auth::password::hash_password_blocking;
use portal_auth::{AdminAuth, Role, User, normalize_email};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 8;

fn default_active() -> bool {
    true
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Request body for updating a user. Omitted fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub client_id: Option<String>,
    pub active: Option<bool>,
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::bad_request("email must be a valid address")),
    }
}

/// Resolves the client link for a role. Clients need an existing client.
async fn resolve_client_link(
    state: &AppState,
    role: Role,
    client_id: Option<String>,
) -> Result<Option<String>, ApiError> {
    match role {
        Role::Admin => Ok(None),
        Role::Client => {
            let client_id = client_id
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| ApiError::bad_request("client users require client_id"))?;
            if state.storage.get_client(&client_id).await?.is_none() {
                return Err(ApiError::bad_request(format!(
                    "client not found: {client_id}"
                )));
            }
            Ok(Some(client_id))
        }
    }
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.users.list_users().await?))
}

/// GET /admin/users/{id}
pub async fn read_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user not found: {id}")))?;
    Ok(Json(user))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_email(&request.email)?;
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    check_password(&request.password)?;
    let client_id = resolve_client_link(&state, request.role, request.client_id).await?;

    let hash = hash_password_blocking(request.password).await?;
    let mut builder = User::builder(&request.email, request.name.trim(), request.role)
        .password_hash(hash)
        .active(request.active);
    if let Some(client_id) = client_id {
        builder = builder.client_id(client_id);
    }
    let user = state.users.create_user(builder.build()).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    state
        .activity
        .record(
            &admin.email,
            "create",
            "user",
            Some(&user.id),
            Some(json!({ "email": user.email, "role": user.role })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user not found: {id}")))?;

    if let Some(email) = request.email {
        check_email(&email)?;
        user.email = normalize_email(&email);
    }
    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("name must not be empty"));
        }
        user.name = name.trim().to_string();
    }
    if let Some(password) = request.password {
        check_password(&password)?;
        user.password_hash = Some(hash_password_blocking(password).await?);
    }
    if let Some(active) = request.active {
        user.active = active;
    }

    let role = request.role.unwrap_or(user.role);
    let client_id = request.client_id.or(user.client_id.take());
    user.client_id = resolve_client_link(&state, role, client_id).await?;
    user.role = role;

    let user = state.users.update_user(user).await?;

    tracing::info!(user_id = %user.id, "User updated");
    state
        .activity
        .record(&admin.email, "update", "user", Some(&id), None)
        .await;

    Ok(Json(user))
}

/// DELETE /admin/users/{id}
///
/// The signed-in admin cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminAuth(admin): AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    if admin.sub == id {
        return Err(ApiError::bad_request("cannot delete the signed-in user"));
    }
    if !state.users.delete_user(&id).await? {
        return Err(ApiError::not_found(format!("user not found: {id}")));
    }

    tracing::info!(user_id = %id, "User deleted");
    state
        .activity
        .record(&admin.email, "delete", "user", Some(&id), None)
        .await;

    Ok(StatusCode::NO_CONTENT)
}
