mod common;

use axum::http::{header, Method, StatusCode};
use bookapi_authz::BasicCredentials;
use common::{spawn_app, ADMIN, USER};
use serde_json::json;

#[tokio::test]
async fn me_reports_identity_and_roles() {
    let app = spawn_app().await.with_users().await;

    let admin = app.request(Method::GET, "/api/users/me", None, Some(ADMIN)).await;
    assert_eq!(admin.status, StatusCode::OK);
    let body = admin.json();
    assert_eq!(body["email"], ADMIN);
    assert_eq!(body["roles"], json!(["ROLE_ADMIN", "ROLE_USER"]));

    let user = app.request(Method::GET, "/api/users/me", None, Some(USER)).await;
    assert_eq!(user.json()["roles"], json!(["ROLE_USER"]));
    assert!(user.json().get("password").is_none());
}

#[tokio::test]
async fn me_without_credentials_is_unauthorized() {
    let app = spawn_app().await;

    let response = app.get("/api/users/me").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers[header::WWW_AUTHENTICATE],
        "Basic realm=\"bookapi\""
    );
    assert_eq!(response.json()["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn wrong_password_and_garbage_headers_are_unauthorized() {
    let app = spawn_app().await.with_users().await;
    let wrong = BasicCredentials {
        username: ADMIN.to_string(),
        password: "not-the-password".to_string(),
    };

    for value in [wrong.encode(), "Basic !!!".to_string(), "Bearer token".to_string()] {
        let request = axum::http::Request::get("/api/users/me")
            .header(header::AUTHORIZATION, value.as_str())
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(app.router.clone(), request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value}");
    }
}
