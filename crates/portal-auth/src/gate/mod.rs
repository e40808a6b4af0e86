//! Route authorization gate.
//!
//! Every inbound request is classified by path, and protected paths are only
//! let through with a valid credential of a compatible role:
//!
//! | Class             | Token missing/invalid | Wrong role            | Otherwise |
//! |-------------------|-----------------------|-----------------------|-----------|
//! | `Public`          | allowed               | allowed               | allowed   |
//! | `AdminProtected`  | admin login           | unauthorized page     | allowed   |
//! | `PortalProtected` | portal login          | unauthorized page     | allowed   |
//!
//! The decision is a pure function of the path, the presented token and the
//! current time; the axum adapter lives in [`crate::middleware::gate`].

use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::RouteConfig;
use crate::token::{Credential, Role, SessionTokenService, Verification};

/// Access class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No credential required.
    Public,
    /// Under the admin prefix, excluding the admin login page.
    AdminProtected,
    /// Under the portal prefix.
    PortalProtected,
}

impl RouteClass {
    /// Returns `true` if `role` may access routes of this class.
    #[must_use]
    pub fn permits(self, role: Role) -> bool {
        match (self, role) {
            (Self::Public, _) => true,
            (Self::AdminProtected, Role::Admin) => true,
            (Self::AdminProtected, Role::Client) => false,
            (Self::PortalProtected, Role::Admin | Role::Client) => true,
        }
    }
}

/// Outcome of running the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Pass the request to its handler. Protected routes carry the verified
    /// credential.
    Allowed(Option<Credential>),
    /// Send the browser to the login page for this area.
    RedirectToLogin(String),
    /// Authenticated, but the role does not fit the area.
    RedirectToUnauthorized(String),
}

/// Classifies paths and decides access.
#[derive(Debug, Clone)]
pub struct RouteGate {
    routes: RouteConfig,
    tokens: Arc<SessionTokenService>,
}

impl RouteGate {
    /// Creates a gate over the given route layout.
    #[must_use]
    pub fn new(routes: RouteConfig, tokens: Arc<SessionTokenService>) -> Self {
        Self {
            routes: routes.normalized(),
            tokens,
        }
    }

    /// Route layout in use.
    #[must_use]
    pub fn routes(&self) -> &RouteConfig {
        &self.routes
    }

    /// Classifies a request path.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if is_under(path, &self.routes.admin_prefix) && !is_under(path, &self.routes.admin_login)
        {
            RouteClass::AdminProtected
        } else if is_under(path, &self.routes.portal_prefix) {
            RouteClass::PortalProtected
        } else {
            RouteClass::Public
        }
    }

    /// Login page for a protected class.
    fn login_target(&self, class: RouteClass) -> String {
        match class {
            RouteClass::AdminProtected => self.routes.admin_login.clone(),
            RouteClass::PortalProtected | RouteClass::Public => self.routes.portal_login.clone(),
        }
    }

    /// Decides access for `path` given the token from the request, if any.
    #[must_use]
    pub fn decide(&self, path: &str, token: Option<&str>) -> GateDecision {
        self.decide_at(path, token, OffsetDateTime::now_utc())
    }

    /// Decides access as if the current time were `now`.
    #[must_use]
    pub fn decide_at(&self, path: &str, token: Option<&str>, now: OffsetDateTime) -> GateDecision {
        let class = self.classify(path);
        if class == RouteClass::Public {
            return GateDecision::Allowed(None);
        }

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::debug!(path = %path, ?class, "No session token, redirecting to login");
            return GateDecision::RedirectToLogin(self.login_target(class));
        };

        let credential = match self.tokens.verify_at(token, now) {
            Verification::Valid(credential) => credential,
            Verification::Invalid => {
                tracing::debug!(path = %path, ?class, "Invalid session token, redirecting to login");
                return GateDecision::RedirectToLogin(self.login_target(class));
            }
        };

        if !class.permits(credential.role) {
            tracing::debug!(
                path = %path,
                subject = %credential.sub,
                role = %credential.role,
                "Role not permitted, redirecting to unauthorized"
            );
            return GateDecision::RedirectToUnauthorized(self.routes.unauthorized.clone());
        }

        GateDecision::Allowed(Some(credential))
    }
}

/// Returns `true` if `path` equals `prefix` or lies beneath it as a path
/// segment (`/admin` covers `/admin/x` but not `/administrator`).
pub(crate) fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate() -> RouteGate {
        let tokens = Arc::new(SessionTokenService::new(
            b"gate-secret",
            Duration::from_secs(7 * 24 * 3600),
        ));
        RouteGate::new(RouteConfig::default(), tokens)
    }

    fn token(gate: &RouteGate, role: Role) -> String {
        gate.tokens.issue("user-1", "user@example.com", role).unwrap()
    }

    #[test]
    fn test_classification() {
        let gate = gate();
        assert_eq!(gate.classify("/admin/dashboard"), RouteClass::AdminProtected);
        assert_eq!(gate.classify("/admin"), RouteClass::AdminProtected);
        assert_eq!(gate.classify("/admin/login"), RouteClass::Public);
        assert_eq!(gate.classify("/admin/login/"), RouteClass::Public);
        assert_eq!(gate.classify("/portal/resources"), RouteClass::PortalProtected);
        assert_eq!(gate.classify("/client-portal"), RouteClass::Public);
        assert_eq!(gate.classify("/administrator"), RouteClass::Public);
        assert_eq!(gate.classify("/"), RouteClass::Public);
    }

    #[test]
    fn test_role_permissions() {
        assert!(RouteClass::AdminProtected.permits(Role::Admin));
        assert!(!RouteClass::AdminProtected.permits(Role::Client));
        assert!(RouteClass::PortalProtected.permits(Role::Admin));
        assert!(RouteClass::PortalProtected.permits(Role::Client));
        assert!(RouteClass::Public.permits(Role::Client));
    }

    #[test]
    fn test_admin_without_token_redirects_to_admin_login() {
        assert_eq!(
            gate().decide("/admin/dashboard", None),
            GateDecision::RedirectToLogin("/admin/login".to_string())
        );
    }

    #[test]
    fn test_admin_with_client_token_redirects_to_unauthorized() {
        let gate = gate();
        let token = token(&gate, Role::Client);
        assert_eq!(
            gate.decide("/admin/dashboard", Some(&token)),
            GateDecision::RedirectToUnauthorized("/unauthorized".to_string())
        );
    }

    #[test]
    fn test_admin_with_admin_token_allowed() {
        let gate = gate();
        let token = token(&gate, Role::Admin);
        match gate.decide("/admin/dashboard", Some(&token)) {
            GateDecision::Allowed(Some(credential)) => assert_eq!(credential.role, Role::Admin),
            other => panic!("expected Allowed, got {other:?}"),
        }
    }

    #[test]
    fn test_portal_without_token_redirects_to_portal_login() {
        assert_eq!(
            gate().decide("/portal/resources", None),
            GateDecision::RedirectToLogin("/client-portal".to_string())
        );
    }

    #[test]
    fn test_portal_with_client_token_allowed() {
        let gate = gate();
        let token = token(&gate, Role::Client);
        assert!(matches!(
            gate.decide("/portal/resources", Some(&token)),
            GateDecision::Allowed(Some(_))
        ));
    }

    #[test]
    fn test_admin_login_is_public() {
        assert_eq!(gate().decide("/admin/login", None), GateDecision::Allowed(None));
    }

    #[test]
    fn test_invalid_token_treated_as_missing() {
        let gate = gate();
        assert_eq!(
            gate.decide("/portal/resources", Some("garbage")),
            GateDecision::RedirectToLogin("/client-portal".to_string())
        );
        assert_eq!(
            gate.decide("/admin/clients", Some("")),
            GateDecision::RedirectToLogin("/admin/login".to_string())
        );
    }

    #[test]
    fn test_expired_token_redirects_to_login() {
        let gate = gate();
        let token = token(&gate, Role::Admin);
        let later = OffsetDateTime::now_utc() + time::Duration::days(8);
        assert_eq!(
            gate.decide_at("/admin/dashboard", Some(&token), later),
            GateDecision::RedirectToLogin("/admin/login".to_string())
        );
    }

    #[test]
    fn test_public_path_ignores_token() {
        assert_eq!(gate().decide("/healthz", Some("garbage")), GateDecision::Allowed(None));
    }

    #[test]
    fn test_trailing_slash_routes_normalized() {
        let tokens = Arc::new(SessionTokenService::new(b"gate-secret", Duration::from_secs(60)));
        let routes = RouteConfig {
            admin_prefix: "/admin/".to_string(),
            admin_login: "/admin/login/".to_string(),
            ..RouteConfig::default()
        };
        let gate = RouteGate::new(routes, tokens);
        assert_eq!(gate.routes().admin_prefix, "/admin");
        assert_eq!(gate.classify("/admin/dashboard"), RouteClass::AdminProtected);
        assert_eq!(
            gate.decide("/admin/dashboard", None),
            GateDecision::RedirectToLogin("/admin/login".to_string())
        );
    }
}
