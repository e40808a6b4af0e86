//! Login endpoints for the admin area and the client portal.
//!
//! Both accept `{"email", "password"}`, and on success set the session
//! cookie and return the user. The admin endpoint additionally requires the
//! admin role; the portal endpoint accepts any active user.

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::cookie::session_cookie;
use crate::error::AuthError;
use crate::middleware::AuthState;
use crate::password::verify_password_blocking;
use crate::storage::User;
use crate::token::Role;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The signed-in user (without password hash).
    pub user: User,
    /// Seconds until the session expires.
    pub expires_in: u64,
}

/// Area a login request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginArea {
    /// Admin area: admin role only.
    Admin,
    /// Client portal: any role.
    Portal,
}

/// `POST <admin_login>`
pub async fn admin_login_handler(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AuthResult<(CookieJar, Json<LoginResponse>)> {
    login(&state, jar, request, LoginArea::Admin).await
}

/// `POST <portal_login>`
pub async fn portal_login_handler(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AuthResult<(CookieJar, Json<LoginResponse>)> {
    login(&state, jar, request, LoginArea::Portal).await
}

async fn login(
    state: &AuthState,
    jar: CookieJar,
    request: LoginRequest,
    area: LoginArea,
) -> AuthResult<(CookieJar, Json<LoginResponse>)> {
    let user = authenticate(state, &request).await?;

    if area == LoginArea::Admin && user.role != Role::Admin {
        tracing::info!(user_id = %user.id, "Non-admin attempted admin login");
        return Err(AuthError::forbidden("Admin access required"));
    }

    let token = state.tokens.issue(&user.id, &user.email, user.role)?;
    let cookie = session_cookie(&state.config, &token);

    tracing::info!(user_id = %user.id, role = %user.role, ?area, "User logged in");
    if let Some(callback) = &state.on_login {
        callback(&user);
    }

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user,
            expires_in: state.tokens.lifetime().as_secs(),
        }),
    ))
}

/// Checks an email/password pair against user storage.
///
/// Unknown users, inactive users, users without a password and wrong
/// passwords all produce `InvalidCredentials`.
pub async fn authenticate(state: &AuthState, request: &LoginRequest) -> AuthResult<User> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AuthError::invalid_request("email and password are required"));
    }

    let user = state.users.find_by_email(&request.email).await?;
    let hash = match &user {
        None => {
            tracing::debug!("Login failed: unknown email");
            None
        }
        Some(user) if !user.is_active() => {
            tracing::debug!(user_id = %user.id, "Login failed: inactive user");
            None
        }
        Some(user) if user.password_hash.is_none() => {
            tracing::debug!(user_id = %user.id, "Login failed: no password set");
            None
        }
        Some(user) => user.password_hash.clone(),
    };

    // One Argon2 check per attempt, with or without a stored hash.
    let checked = hash.is_some();
    let matches = verify_password_blocking(request.password.clone(), hash).await?;

    let Some(user) = user.filter(|_| matches) else {
        if checked {
            tracing::debug!("Login failed: wrong password");
        }
        return Err(AuthError::InvalidCredentials);
    };

    Ok(user)
}
