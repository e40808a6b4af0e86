//! Implementation of the `UserStorage` trait for InMemoryStorage.

use async_trait::async_trait;
use portal_auth::{AuthError, AuthResult, User, UserStorage, normalize_email};
use time::OffsetDateTime;

use crate::storage::{self, InMemoryStorage, Stored};

impl InMemoryStorage {
    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        self.users
            .pin()
            .iter()
            .any(|(id, stored)| stored.record.email == email && Some(id.as_str()) != except_id)
    }
}

#[async_trait]
impl UserStorage for InMemoryStorage {
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>> {
        Ok(storage::get(&self.users, id))
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let email = normalize_email(email);
        Ok(storage::rows(&self.users, |u| u.email == email).into_iter().next())
    }

    async fn list_users(&self) -> AuthResult<Vec<User>> {
        Ok(storage::rows(&self.users, |_| true))
    }

    async fn create_user(&self, mut user: User) -> AuthResult<User> {
        let _lock = self.write_lock().await;

        user.email = normalize_email(&user.email);
        if self.email_taken(&user.email, None) {
            return Err(AuthError::conflict(format!("email {} is already registered", user.email)));
        }
        if storage::contains(&self.users, &user.id) {
            return Err(AuthError::conflict(format!("user {} already exists", user.id)));
        }

        self.users.pin().insert(
            user.id.clone(),
            Stored {
                seq: self.next_seq(),
                record: user.clone(),
            },
        );
        Ok(user)
    }

    async fn update_user(&self, mut user: User) -> AuthResult<User> {
        let _lock = self.write_lock().await;

        let guard = self.users.pin();
        let current = guard
            .get(&user.id)
            .cloned()
            .ok_or_else(|| AuthError::not_found(format!("user {}", user.id)))?;

        user.email = normalize_email(&user.email);
        if self.email_taken(&user.email, Some(&user.id)) {
            return Err(AuthError::conflict(format!("email {} is already registered", user.email)));
        }

        user.created_at = current.record.created_at;
        user.updated_at = OffsetDateTime::now_utc();
        guard.insert(
            user.id.clone(),
            Stored {
                seq: current.seq,
                record: user.clone(),
            },
        );
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> AuthResult<bool> {
        let _lock = self.write_lock().await;
        Ok(self.users.pin().remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_auth::Role;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let storage = InMemoryStorage::new();
        let user = storage
            .create_user(User::new("Ada@Example.com", "Ada", Role::Admin))
            .await
            .unwrap();

        let found = storage.find_by_email(" ADA@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(storage.find_by_id(&user.id).await.unwrap().unwrap().email, "ada@example.com");
        assert!(storage.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let storage = InMemoryStorage::new();
        storage
            .create_user(User::new("a@example.com", "A", Role::Admin))
            .await
            .unwrap();
        let err = storage
            .create_user(User::new("A@example.com", "Again", Role::Client))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_user() {
        let storage = InMemoryStorage::new();
        let a = storage
            .create_user(User::new("a@example.com", "A", Role::Admin))
            .await
            .unwrap();
        let b = storage
            .create_user(User::new("b@example.com", "B", Role::Client))
            .await
            .unwrap();

        let mut renamed = a.clone();
        renamed.name = "Ada".into();
        let updated = storage.update_user(renamed).await.unwrap();
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.created_at, a.created_at);

        let mut clash = b.clone();
        clash.email = "a@example.com".into();
        assert!(matches!(
            storage.update_user(clash).await.unwrap_err(),
            AuthError::Conflict { .. }
        ));

        let ghost = User::new("ghost@example.com", "Ghost", Role::Client);
        assert!(matches!(
            storage.update_user(ghost).await.unwrap_err(),
            AuthError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let storage = InMemoryStorage::new();
        let user = storage
            .create_user(User::new("a@example.com", "A", Role::Admin))
            .await
            .unwrap();
        assert!(storage.delete_user(&user.id).await.unwrap());
        assert!(!storage.delete_user(&user.id).await.unwrap());
        assert!(storage.list_users().await.unwrap().is_empty());
    }
}
