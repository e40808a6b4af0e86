//! Axum handlers for login, logout and session introspection.

pub mod login;
pub mod logout;

pub use login::{
    LoginArea, LoginRequest, LoginResponse, admin_login_handler, authenticate,
    portal_login_handler,
};
pub use logout::{SessionResponse, logout_handler, session_handler};

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::{get, post},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::AuthResult;
    use crate::config::AuthConfig;
    use crate::error::AuthError;
    use crate::middleware::AuthState;
    use crate::password::hash_password;
    use crate::storage::{User, UserStorage, normalize_email};
    use crate::token::Role;

    #[derive(Default)]
    struct VecUsers(Mutex<Vec<User>>);

    #[async_trait]
    impl UserStorage for VecUsers {
        async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>> {
            Ok(self.0.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
            let email = normalize_email(email);
            Ok(self.0.lock().unwrap().iter().find(|u| u.email == email).cloned())
        }

        async fn list_users(&self) -> AuthResult<Vec<User>> {
            Ok(self.0.lock().unwrap().clone())
        }

        async fn create_user(&self, user: User) -> AuthResult<User> {
            self.0.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn update_user(&self, _user: User) -> AuthResult<User> {
            Err(AuthError::internal("not used"))
        }

        async fn delete_user(&self, _id: &str) -> AuthResult<bool> {
            Ok(false)
        }
    }

    async fn app() -> (Router, Arc<Mutex<Vec<String>>>) {
        let users = Arc::new(VecUsers::default());
        let hash = hash_password("correct horse").unwrap();
        users
            .create_user(
                User::builder("admin@example.com", "Admin", Role::Admin)
                    .password_hash(hash.clone())
                    .build(),
            )
            .await
            .unwrap();
        users
            .create_user(
                User::builder("client@example.com", "Client", Role::Client)
                    .password_hash(hash.clone())
                    .client_id("client-1")
                    .build(),
            )
            .await
            .unwrap();
        users
            .create_user(
                User::builder("gone@example.com", "Gone", Role::Client)
                    .password_hash(hash)
                    .active(false)
                    .build(),
            )
            .await
            .unwrap();

        let logins = Arc::new(Mutex::new(Vec::new()));
        let seen = logins.clone();
        let state = AuthState::new(AuthConfig::default(), users)
            .unwrap()
            .with_login_callback(Arc::new(move |user: &User| {
                seen.lock().unwrap().push(user.email.clone());
            }));

        let router = Router::new()
            .route("/admin/login", post(admin_login_handler))
            .route("/client-portal", post(portal_login_handler))
            .route("/auth/logout", post(logout_handler))
            .route("/auth/session", get(session_handler))
            .with_state(state);
        (router, logins)
    }

    fn login_request(path: &str, email: &str, password: &str) -> Request<Body> {
        Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(
                r#"{{"email":"{email}","password":"{password}"}}"#
            )))
            .unwrap()
    }

    fn session_cookie_value(response: &axum::response::Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie header")
            .to_str()
            .unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        pair.trim_start_matches("auth-token=").to_string()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_admin_login_sets_cookie() {
        let (app, logins) = app().await;
        let response = app
            .oneshot(login_request("/admin/login", "Admin@Example.com", "correct horse"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("auth-token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));

        let body = json_body(response).await;
        assert_eq!(body["user"]["email"], "admin@example.com");
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(logins.lock().unwrap().as_slice(), ["admin@example.com"]);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (app, logins) = app().await;
        let response = app
            .oneshot(login_request("/admin/login", "admin@example.com", "nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["error"], "invalid_credentials");
        assert!(logins.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_users_rejected() {
        let (app, _) = app().await;
        let response = app
            .clone()
            .oneshot(login_request("/client-portal", "nobody@example.com", "x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(login_request("/client-portal", "gone@example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_client_cannot_use_admin_login() {
        let (app, _) = app().await;
        let response = app
            .oneshot(login_request("/admin/login", "client@example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let (app, _) = app().await;
        let response = app
            .oneshot(login_request("/client-portal", "", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_portal_login_then_session_then_logout() {
        let (app, _) = app().await;
        let response = app
            .clone()
            .oneshot(login_request("/client-portal", "client@example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = session_cookie_value(&response);

        let response = app
            .clone()
            .oneshot(
                Request::get("/auth/session")
                    .header(header::COOKIE, format!("auth-token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["credential"]["role"], "client");
        assert_eq!(body["credential"]["email"], "client@example.com");

        let response = app
            .clone()
            .oneshot(
                Request::post("/auth/logout")
                    .header(header::COOKIE, format!("auth-token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cleared.starts_with("auth-token=;"));
        assert!(cleared.contains("Max-Age=0"));

        let response = app
            .oneshot(Request::get("/auth/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["authenticated"], false);
        assert!(body.get("credential").is_none());
    }
}
