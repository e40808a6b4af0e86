//! User storage trait.
//!
//! Defines the interface for user persistence operations.
//! Implementations are provided by storage backends (e.g., in-memory).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::token::Role;

/// Normalizes an email for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

// =============================================================================
// User Type
// =============================================================================

/// A user able to sign in to the admin area or the client portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: String,

    /// Login email, stored normalized.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Argon2 PHC hash. Never serialized into responses.
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,

    /// Role granted at login.
    pub role: Role,

    /// Client this user belongs to (client-role users only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Inactive users cannot sign in.
    pub active: bool,

    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new active user with a generated ID and no password.
    #[must_use]
    pub fn new(email: &str, name: impl Into<String>, role: Role) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name: name.into(),
            password_hash: None,
            role,
            client_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user builder.
    #[must_use]
    pub fn builder(email: &str, name: impl Into<String>, role: Role) -> UserBuilder {
        UserBuilder {
            user: Self::new(email, name, role),
        }
    }

    /// Returns `true` if the user account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

// =============================================================================
// User Builder
// =============================================================================

/// Builder for creating `User` instances.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    /// Sets the user ID.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.user.id = id.into();
        self
    }

    /// Sets the stored password hash.
    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.user.password_hash = Some(hash.into());
        self
    }

    /// Links the user to a client.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.user.client_id = Some(client_id.into());
        self
    }

    /// Sets whether the account is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.user.active = active;
        self
    }

    /// Builds the user.
    #[must_use]
    pub fn build(self) -> User {
        self.user
    }
}

// =============================================================================
// Storage Trait
// =============================================================================

/// Persistence for users.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>>;

    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Lists all users ordered by creation time.
    async fn list_users(&self) -> AuthResult<Vec<User>>;

    /// Stores a new user.
    ///
    /// Fails with `AuthError::Conflict` if the email is taken.
    async fn create_user(&self, user: User) -> AuthResult<User>;

    /// Replaces an existing user.
    ///
    /// Fails with `AuthError::NotFound` for unknown IDs and
    /// `AuthError::Conflict` if the new email belongs to another user.
    async fn update_user(&self, user: User) -> AuthResult<User>;

    /// Deletes a user. Returns `false` if it did not exist.
    async fn delete_user(&self, id: &str) -> AuthResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let user = User::new("  Ada@Example.COM ", "Ada", Role::Admin);
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_builder() {
        let user = User::builder("c@example.com", "Carol", Role::Client)
            .id("user-1")
            .client_id("client-9")
            .password_hash("$argon2id$...")
            .active(false)
            .build();

        assert_eq!(user.id, "user-1");
        assert_eq!(user.client_id.as_deref(), Some("client-9"));
        assert!(!user.is_active());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::builder("a@example.com", "Ada", Role::Admin)
            .password_hash("secret-hash")
            .build();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
