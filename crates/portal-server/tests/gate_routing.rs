mod common;

use axum::http::StatusCode;
use common::{location, test_app, test_app_with};
use portal_auth::{Role, User};
use portal_server::AppConfig;

#[tokio::test]
async fn admin_without_cookie_redirects_to_admin_login() {
    let app = test_app().await;
    let res = app.get("/admin/dashboard", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/admin/login");
}

#[tokio::test]
async fn admin_with_client_cookie_redirects_to_unauthorized() {
    let app = test_app().await;
    let cookie = app.cookie(&app.client_user);
    let res = app.get("/admin/dashboard", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/unauthorized");
}

#[tokio::test]
async fn admin_with_admin_cookie_is_allowed() {
    let app = test_app().await;
    let cookie = app.cookie(&app.admin);
    let res = app.get("/admin/dashboard", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn portal_without_cookie_redirects_to_portal_login() {
    let app = test_app().await;
    let res = app.get("/portal/resources", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/client-portal");
}

#[tokio::test]
async fn portal_with_client_cookie_is_allowed() {
    let app = test_app().await;
    let cookie = app.cookie(&app.client_user);
    let res = app.get("/portal/resources", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_login_is_public() {
    let app = test_app().await;
    let res = app.get("/admin/login", None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_missing() {
    let app = test_app().await;
    let cookie = app.cookie(&app.admin);
    // Change one character inside the signature segment.
    let at = cookie.len() - 5;
    let replacement = if &cookie[at..at + 1] == "A" { "B" } else { "A" };
    let cookie = format!("{}{replacement}{}", &cookie[..at], &cookie[at + 1..]);

    let res = app.get("/admin/dashboard", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/admin/login");
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let app = test_app().await;
    let foreign = portal_auth::SessionTokenService::new(
        b"some-other-secret",
        std::time::Duration::from_secs(3600),
    );
    let token = foreign
        .issue(&app.admin.id, &app.admin.email, Role::Admin)
        .unwrap();

    let res = app
        .get("/portal/dashboard", Some(&format!("auth-token={token}")))
        .await;
    assert_eq!(location(&res), "/client-portal");
}

#[tokio::test]
async fn similar_prefix_is_public() {
    let app = test_app().await;
    // Not under /admin as a path segment, so the gate lets it through.
    let res = app.get("/administrator", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_routes_need_no_cookie() {
    let app = test_app().await;
    for path in ["/", "/healthz", "/readyz", "/client-portal", "/auth/session"] {
        let res = app.get(path, None).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
    let res = app.get("/unauthorized", None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn redirects_carry_request_id() {
    let app = test_app().await;
    let res = app.get("/admin/clients", None).await;
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn client_without_linked_client_is_forbidden_in_portal() {
    let app = test_app().await;
    let orphan = User::new("orphan@example.com", "Orphan", Role::Client);
    let cookie = app.cookie(&orphan);
    let res = app.get("/portal/dashboard", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn trailing_slash_prefixes_still_route() {
    let mut cfg = AppConfig::default();
    cfg.auth.routes.admin_prefix = "/admin/".to_string();
    cfg.auth.routes.portal_prefix = "/portal/".to_string();
    let app = test_app_with(cfg).await;

    let admin = app.cookie(&app.admin);
    let res = app.get("/admin/dashboard", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = app.get("/admin", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let client = app.cookie(&app.client_user);
    let res = app.get("/portal/dashboard", Some(&client)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.get("/admin/dashboard", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/admin/login");
}
