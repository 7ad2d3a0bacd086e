#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bookapi_app::{modules::users, Application};
use bookapi_authz::{BasicCredentials, Role};
use bookapi_kernel::settings::Settings;
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "password";
pub const ADMIN: &str = "admin@bookapi.com";
pub const USER: &str = "user@bookapi.com";

pub struct TestApp {
    pub app: Application,
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is UTF-8")
    }

    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .expect("Location header")
            .to_str()
            .unwrap()
    }
}

/// Fresh app over its own in-memory database, migrated and initialized.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Settings::in_memory()).await
}

pub async fn spawn_app_with(settings: Settings) -> TestApp {
    let app = Application::start(settings).await.expect("application starts");
    let router = app.router();
    TestApp { app, router }
}

impl TestApp {
    pub fn db(&self) -> &DatabaseConnection {
        &self.app.context().db
    }

    /// Adds `user@bookapi.com` (ROLE_USER) and `admin@bookapi.com` (ROLE_ADMIN).
    pub async fn with_users(self) -> Self {
        users::register_user(self.db(), USER, PASSWORD, &[Role::User])
            .await
            .unwrap();
        users::register_user(self.db(), ADMIN, PASSWORD, &[Role::Admin])
            .await
            .unwrap();
        self
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        login: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(email) = login {
            let credentials = BasicCredentials {
                username: email.to_string(),
                password: PASSWORD.to_string(),
            };
            builder = builder.header(header::AUTHORIZATION, credentials.encode());
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value, login: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), login).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, None).await
    }

    /// Creates an author through the API and returns its id.
    pub async fn create_author(&self, first_name: &str, last_name: &str) -> i64 {
        let response = self
            .post(
                "/api/authors",
                serde_json::json!({ "firstName": first_name, "lastName": last_name }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["id"].as_i64().unwrap()
    }

    /// Creates a book as admin; requires `with_users`.
    pub async fn create_book(&self, title: &str, id_author: Option<i64>) -> i64 {
        let response = self
            .post(
                "/api/books",
                serde_json::json!({
                    "title": title,
                    "coverText": format!("Cover of {title}"),
                    "idAuthor": id_author,
                }),
                Some(ADMIN),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["id"].as_i64().unwrap()
    }
}
