//! Session token issuing and verification.
//!
//! Tokens are compact JWS strings signed with HMAC-SHA256 over the
//! header and payload using a process-wide secret. The signature check is
//! done by `jsonwebtoken`, which compares MACs in constant time.
//!
//! Expiry is checked here rather than by `jsonwebtoken` so the comparison
//! runs against an explicit `now` with no leeway; this also lets tests move
//! the clock.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use time::OffsetDateTime;

use crate::config::{AuthConfig, ConfigError};
use crate::error::AuthError;

use super::credential::{Credential, Role, Verification};

/// Issues and verifies signed, time-bounded session tokens.
///
/// Stateless apart from the secret, so it is shared behind an `Arc` across
/// all request handlers.
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionTokenService {
    /// Creates a service signing with `secret` and issuing tokens valid for
    /// `lifetime`.
    #[must_use]
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Builds the service from auth configuration.
    ///
    /// # Errors
    /// Fails if no usable signing secret is configured for production.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let secret = config.signing_secret()?;
        Ok(Self::new(secret.as_bytes(), config.session.lifetime))
    }

    /// Token lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for the given identity, valid from now.
    ///
    /// # Errors
    /// Returns an error only if serialization or signing fails.
    pub fn issue(
        &self,
        subject_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Result<String, AuthError> {
        self.issue_at(subject_id, email, role, OffsetDateTime::now_utc())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns an error only if serialization or signing fails.
    pub fn issue_at(
        &self,
        subject_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        now: OffsetDateTime,
    ) -> Result<String, AuthError> {
        let iat = now.unix_timestamp();
        let credential = Credential {
            sub: subject_id.into(),
            email: email.into(),
            role,
            iat,
            exp: iat + self.lifetime.as_secs() as i64,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &credential, &self.encoding_key)?;

        tracing::debug!(
            subject = %credential.sub,
            role = %credential.role,
            jti = %credential.jti,
            "Session token issued"
        );
        Ok(token)
    }

    /// Verifies a token against the current time.
    #[must_use]
    pub fn verify(&self, token: &str) -> Verification {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Verifies a token as if the current time were `now`.
    ///
    /// Never fails: malformed input, a bad signature and expiry all yield
    /// [`Verification::Invalid`].
    #[must_use]
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Verification {
        let credential = match decode::<Credential>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature => "signature mismatch",
                    ErrorKind::InvalidAlgorithm => "unexpected algorithm",
                    _ => "malformed token",
                };
                tracing::debug!(reason, error = %e, "Session token rejected");
                return Verification::Invalid;
            }
        };

        if credential.is_expired_at(now) {
            tracing::debug!(
                reason = "expired",
                jti = %credential.jti,
                exp = credential.exp,
                "Session token rejected"
            );
            return Verification::Invalid;
        }

        Verification::Valid(credential)
    }
}

impl fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("algorithm", &"HS256")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
