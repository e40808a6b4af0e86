#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use portal_auth::{Role, User, UserStorage};
use portal_db_memory::InMemoryStorage;
use portal_server::{AppConfig, AppState, build_router};
use portal_storage::{Client, ClientInput, ClientStorage};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub storage: Arc<InMemoryStorage>,
    pub admin: User,
    pub client: Client,
    pub client_user: User,
}

/// App over a fresh in-memory store with one admin, one client and one
/// client user. Users have no passwords; sessions come from [`TestApp::cookie`].
pub async fn test_app() -> TestApp {
    test_app_with(AppConfig::default()).await
}

/// Same as [`test_app`] over a caller-supplied configuration.
pub async fn test_app_with(cfg: AppConfig) -> TestApp {
    let storage = Arc::new(InMemoryStorage::new());
    let state = AppState::new(&cfg, storage.clone(), storage.clone()).expect("state");

    let admin = storage
        .create_user(User::new("admin@example.com", "Admin", Role::Admin))
        .await
        .unwrap();
    let client = storage
        .create_client(ClientInput {
            name: "Acme".into(),
            ..ClientInput::default()
        })
        .await
        .unwrap();
    let client_user = storage
        .create_user(
            User::builder("carol@acme.test", "Carol", Role::Client)
                .client_id(client.id.clone())
                .build(),
        )
        .await
        .unwrap();

    TestApp {
        router: build_router(state.clone()),
        state,
        storage,
        admin,
        client,
        client_user,
    }
}

impl TestApp {
    /// `Cookie` header value carrying a session for `user`.
    pub fn cookie(&self, user: &User) -> String {
        let token = self
            .state
            .auth
            .tokens
            .issue(&user.id, &user.email, user.role)
            .unwrap();
        format!("auth-token={token}")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        cookie: &str,
        body: Value,
    ) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
}
