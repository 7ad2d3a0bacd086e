//! Users: credential storage and the `CurrentUser` extractor.

pub mod accounts;
pub mod auth;
pub mod entity;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookapi_authz::Principal;
use bookapi_http::ApiJson;
use bookapi_kernel::{AppContext, InitCtx, Migration, Module};
use serde_json::json;

pub use accounts::register_user;
pub use auth::CurrentUser;

pub const MODULE_NAME: &str = "users";

pub struct UsersModule;

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &AppContext) -> Router {
        Router::new()
            .route("/me", get(me))
            .with_state(ctx.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/me": {
                    "get": {
                        "summary": "The authenticated caller",
                        "tags": ["Users"],
                        "security": [{ "basicAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Identity and roles",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/CurrentUser" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or wrong credentials",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "securitySchemes": {
                    "basicAuth": { "type": "http", "scheme": "basic" }
                },
                "schemas": {
                    "CurrentUser": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "email": { "type": "string", "format": "email" },
                            "roles": {
                                "type": "array",
                                "items": { "type": "string", "enum": ["ROLE_USER", "ROLE_ADMIN"] }
                            }
                        },
                        "required": ["id", "email", "roles"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_user",
            up: r#"
                CREATE TABLE IF NOT EXISTS "user" (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    email    TEXT NOT NULL UNIQUE,
                    roles    TEXT NOT NULL DEFAULT '[]',
                    password TEXT NOT NULL
                )
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

async fn me(CurrentUser(principal): CurrentUser) -> ApiJson<Principal> {
    ApiJson(principal)
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(UsersModule)
}
