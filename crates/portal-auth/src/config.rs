//! Authentication and authorization configuration.
//!
//! Covers the token signing secret, session lifetime, the `auth-token`
//! cookie attributes, and the path prefixes the route gate protects.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! secret = "change-me"
//! production = true
//!
//! [auth.session]
//! lifetime = "7d"
//!
//! [auth.routes]
//! admin_prefix = "/admin"
//! portal_prefix = "/portal"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gate::is_under;

/// Signing secret used when none is configured outside production.
pub const DEVELOPMENT_SECRET: &str = "portal-development-secret-do-not-use-in-production";

/// Errors raised while validating auth configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Production deployments must configure their own signing secret.
    #[error("auth.secret must be set in production")]
    MissingSecret,

    /// A configuration value is out of range or malformed.
    #[error("invalid auth config: {message}")]
    Invalid {
        /// Description of the invalid value.
        message: String,
    },
}

impl ConfigError {
    /// Creates a new `Invalid` error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Root authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing session tokens.
    pub secret: Option<String>,

    /// Production mode: forces `Secure` cookies and a real secret.
    pub production: bool,

    /// Session lifetime settings.
    pub session: SessionConfig,

    /// `auth-token` cookie attributes.
    pub cookie: CookieConfig,

    /// Protected path prefixes and redirect targets.
    pub routes: RouteConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            production: false,
            session: SessionConfig::default(),
            cookie: CookieConfig::default(),
            routes: RouteConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Resolves the signing secret.
    ///
    /// A configured, non-empty secret always wins. Without one, development
    /// deployments fall back to [`DEVELOPMENT_SECRET`] and production
    /// deployments refuse to start.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSecret`] in production when no secret
    /// (or the development default) is configured.
    pub fn signing_secret(&self) -> Result<String, ConfigError> {
        match self.secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => {
                if self.production && secret == DEVELOPMENT_SECRET {
                    return Err(ConfigError::MissingSecret);
                }
                Ok(secret.to_string())
            }
            _ if self.production => Err(ConfigError::MissingSecret),
            _ => {
                tracing::warn!("auth.secret not set, using insecure development secret");
                Ok(DEVELOPMENT_SECRET.to_string())
            }
        }
    }

    /// Effective `Secure` attribute for the session cookie.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie.secure.unwrap_or(self.production)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signing_secret()?;

        if self.session.lifetime.is_zero() {
            return Err(ConfigError::invalid("session.lifetime must be > 0"));
        }
        if self.cookie.name.trim().is_empty() {
            return Err(ConfigError::invalid("cookie.name must not be empty"));
        }
        self.routes.validate()
    }
}

/// Session lifetime settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time between token issue and expiry. Also the cookie max-age.
    #[serde(with = "humantime_serde")]
    pub lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
        }
    }
}

/// Attributes of the cookie carrying the serialized token.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,

    /// Hide the cookie from client-side scripts.
    pub http_only: bool,

    /// Explicit `Secure` attribute. Falls back to `AuthConfig::production`.
    pub secure: Option<bool>,

    /// SameSite policy: "strict", "lax" or "none".
    pub same_site: String,

    /// Cookie path.
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "auth-token".to_string(),
            http_only: true,
            secure: None,
            same_site: "lax".to_string(),
            path: "/".to_string(),
        }
    }
}

/// Protected path prefixes and redirect targets used by the route gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Root of admin-protected paths.
    #[serde(deserialize_with = "route_path")]
    pub admin_prefix: String,

    /// Admin login page. Public even though it sits under `admin_prefix`.
    #[serde(deserialize_with = "route_path")]
    pub admin_login: String,

    /// Root of portal-protected paths.
    #[serde(deserialize_with = "route_path")]
    pub portal_prefix: String,

    /// Client-facing login page.
    #[serde(deserialize_with = "route_path")]
    pub portal_login: String,

    /// Target for authenticated requests with the wrong role.
    #[serde(deserialize_with = "route_path")]
    pub unauthorized: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            admin_prefix: "/admin".to_string(),
            admin_login: "/admin/login".to_string(),
            portal_prefix: "/portal".to_string(),
            portal_login: "/client-portal".to_string(),
            unauthorized: "/unauthorized".to_string(),
        }
    }
}

/// Accepts a route path with any trailing `/` removed, so `/admin/` and
/// `/admin` configure the same prefix. A bare `/` is kept for validation
/// to reject.
fn route_path<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_route_path(&raw))
}

pub(crate) fn normalize_route_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

impl RouteConfig {
    /// Copy with trailing slashes removed from every path.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            admin_prefix: normalize_route_path(&self.admin_prefix),
            admin_login: normalize_route_path(&self.admin_login),
            portal_prefix: normalize_route_path(&self.portal_prefix),
            portal_login: normalize_route_path(&self.portal_login),
            unauthorized: normalize_route_path(&self.unauthorized),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("routes.admin_prefix", &self.admin_prefix),
            ("routes.admin_login", &self.admin_login),
            ("routes.portal_prefix", &self.portal_prefix),
            ("routes.portal_login", &self.portal_login),
            ("routes.unauthorized", &self.unauthorized),
        ];
        for (name, path) in paths {
            if !path.starts_with('/') || path.len() < 2 {
                return Err(ConfigError::invalid(format!(
                    "{name} must be an absolute, non-root path"
                )));
            }
        }
        // Redirect targets must stay public or the gate redirects forever.
        let protected = [
            ("routes.admin_prefix", &self.admin_prefix),
            ("routes.portal_prefix", &self.portal_prefix),
        ];
        let targets = [
            ("routes.admin_login", &self.admin_login),
            ("routes.portal_login", &self.portal_login),
            ("routes.unauthorized", &self.unauthorized),
        ];
        for (target_name, target) in targets {
            for (prefix_name, prefix) in protected {
                let exempt =
                    target_name == "routes.admin_login" && prefix_name == "routes.admin_prefix";
                if !exempt && is_under(target, prefix) {
                    return Err(ConfigError::invalid(format!(
                        "{target_name} must not sit under {prefix_name}"
                    )));
                }
            }
        }
        Ok(())
    }
}
