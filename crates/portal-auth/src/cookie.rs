//! The `auth-token` session cookie.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::{Duration, OffsetDateTime};

use crate::config::AuthConfig;

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

/// Builds the cookie carrying a freshly issued token.
///
/// Max-age equals the session lifetime so the browser drops the cookie when
/// the token inside it expires.
#[must_use]
pub fn session_cookie(config: &AuthConfig, token: &str) -> Cookie<'static> {
    let max_age = Duration::seconds(config.session.lifetime.as_secs() as i64);

    Cookie::build((config.cookie.name.clone(), token.to_string()))
        .http_only(config.cookie.http_only)
        .secure(config.cookie_secure())
        .same_site(same_site(&config.cookie.same_site))
        .path(config.cookie.path.clone())
        .max_age(max_age)
        .build()
}

/// Builds a cookie that deletes the session cookie on the client.
#[must_use]
pub fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((config.cookie.name.clone(), ""))
        .http_only(config.cookie.http_only)
        .secure(config.cookie_secure())
        .same_site(same_site(&config.cookie.same_site))
        .path(config.cookie.path.clone())
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Reads the session token from the request's `Cookie` header.
///
/// Empty values count as absent.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::COOKIE};

    #[test]
    fn test_session_cookie_attributes() {
        let config = AuthConfig::default();
        let rendered = session_cookie(&config, "tok").to_string();

        assert!(rendered.contains("auth-token=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=604800"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_secure_in_production() {
        let config = AuthConfig {
            production: true,
            secret: Some("prod".to_string()),
            ..AuthConfig::default()
        };
        assert!(session_cookie(&config, "tok").to_string().contains("Secure"));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let rendered = removal_cookie(&AuthConfig::default()).to_string();
        assert!(rendered.starts_with("auth-token=;"));
        assert!(rendered.contains("Max-Age=0"));
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth-token=abc.def.ghi; other=1"),
        );
        assert_eq!(
            token_from_headers(&headers, "auth-token").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(token_from_headers(&headers, "missing"), None);

        let mut empty = HeaderMap::new();
        empty.insert(COOKIE, HeaderValue::from_static("auth-token="));
        assert_eq!(token_from_headers(&empty, "auth-token"), None);
    }
}
