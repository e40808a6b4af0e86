//! Password hashing.
//!
//! Argon2id with default parameters, stored as PHC strings.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::AuthResult;
use crate::error::AuthError;

/// Hash a password for storage.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// `Ok(false)` on mismatch; `Err` only if the stored hash is not a valid
/// PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Hashes a password on the blocking pool.
///
/// Argon2 is CPU-bound; async callers should use this instead of
/// [`hash_password`].
pub async fn hash_password_blocking(password: String) -> AuthResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::internal(format!("password hash task failed: {e}")))??;
    Ok(hash)
}

/// Checks `password` on the blocking pool.
///
/// Without a stored hash the password is still checked against a
/// placeholder hash and the result is `false`, so a login for an unknown
/// account costs the same Argon2 work as one with a wrong password.
pub async fn verify_password_blocking(password: String, hash: Option<String>) -> AuthResult<bool> {
    let matches = tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => verify_password(&password, placeholder_hash()).map(|_| false),
    })
    .await
    .map_err(|e| AuthError::internal(format!("password check task failed: {e}")))??;
    Ok(matches)
}

/// Argon2id hash of a random password no account ever has.
fn placeholder_hash() -> &'static str {
    static PLACEHOLDER: OnceLock<String> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        let secret = uuid::Uuid::new_v4().to_string();
        hash_password(&secret).unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[tokio::test]
    async fn test_hash_password_blocking() {
        let hash = hash_password_blocking("hunter2".to_string()).await.unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_verify_without_hash_runs_argon2() {
        assert!(placeholder_hash().starts_with("$argon2id$"));
        assert!(!verify_password_blocking("anything".to_string(), None).await.unwrap());

        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password_blocking("hunter2".to_string(), Some(hash.clone())).await.unwrap());
        assert!(!verify_password_blocking("hunter3".to_string(), Some(hash)).await.unwrap());
    }
}
