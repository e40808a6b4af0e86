//! Credential claims carried inside a session token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Staff with access to the admin area.
    Admin,
    /// Customer with access to their own portal.
    Client,
}

impl Role {
    /// Returns the role name as stored in tokens and user records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The identity, role and validity window asserted by a signed token.
///
/// Immutable once issued: the only way to obtain one is
/// [`SessionTokenService::issue`](super::SessionTokenService::issue) followed
/// by a successful verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// Subject (user ID).
    pub sub: String,

    /// User email.
    pub email: String,

    /// Role granted to the subject.
    pub role: Role,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Unique token identifier.
    pub jti: String,
}

impl Credential {
    /// Returns the subject (user ID).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns `true` if the credential carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Issue time as a timestamp.
    #[must_use]
    pub fn issued_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.iat).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Expiry time as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Returns `true` if `now` lies past the expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() > self.exp
    }
}

/// Result of verifying a serialized token.
///
/// Parse failures, signature mismatches and expiry all collapse into
/// `Invalid`; the concrete reason is only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The token is authentic and unexpired.
    Valid(Credential),
    /// The token must not be trusted.
    Invalid,
}

impl Verification {
    /// Converts into an `Option`, dropping the distinction.
    #[must_use]
    pub fn into_credential(self) -> Option<Credential> {
        match self {
            Self::Valid(credential) => Some(credential),
            Self::Invalid => None,
        }
    }

    /// Returns `true` for `Valid`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::Client.to_string(), "client");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }

    #[test]
    fn test_expiry_boundary() {
        let credential = Credential {
            sub: "u1".to_string(),
            email: "a@example.com".to_string(),
            role: Role::Client,
            iat: 1_700_000_000,
            exp: 1_700_000_100,
            jti: "j".to_string(),
        };
        let at_expiry = OffsetDateTime::from_unix_timestamp(1_700_000_100).unwrap();
        assert!(!credential.is_expired_at(at_expiry));
        assert!(credential.is_expired_at(at_expiry + time::Duration::seconds(1)));
    }

    #[test]
    fn test_verification_into_credential() {
        assert!(Verification::Invalid.into_credential().is_none());
        assert!(!Verification::Invalid.is_valid());
    }
}
