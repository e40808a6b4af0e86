//! Startup bootstrap: creates the configured admin user.

use portal_auth::password::hash_password_blocking;
use portal_auth::{AuthResult, Role, User, UserStorage};
use tracing::info;

use crate::config::BootstrapConfig;

/// Creates `bootstrap.admin_user` if no user has its email yet.
///
/// Idempotent: an existing user with that email is left untouched, even if
/// its password or role differ. Returns the created user, if any.
pub async fn bootstrap_admin_user(
    users: &dyn UserStorage,
    config: &BootstrapConfig,
) -> AuthResult<Option<User>> {
    let Some(ref admin) = config.admin_user else {
        return Ok(None);
    };

    if let Some(existing) = users.find_by_email(&admin.email).await? {
        info!(user_id = %existing.id, "Admin user already exists, skipping bootstrap");
        return Ok(None);
    }

    let hash = hash_password_blocking(admin.password.clone()).await?;
    let user = User::builder(&admin.email, admin.name.clone(), Role::Admin)
        .password_hash(hash)
        .build();
    let user = users.create_user(user).await?;

    info!(user_id = %user.id, email = %user.email, "Bootstrapped admin user");
    Ok(Some(user))
}
