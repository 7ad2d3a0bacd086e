//! Authors: CRUD over the `author` table, each author listed with its books.

pub mod entity;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookapi_kernel::{AppContext, InitCtx, Migration, Module};
use serde_json::json;

pub const MODULE_NAME: &str = "authors";

pub struct AuthorsModule;

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &AppContext) -> Router {
        Router::new()
            .route("/", get(handlers::list_authors).post(handlers::create_author))
            .route(
                "/{id}",
                get(handlers::show_author)
                    .put(handlers::update_author)
                    .delete(handlers::delete_author),
            )
            .with_state(ctx.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer" }
        });
        let error = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let with_description = |description: &str| {
            let mut response = error.clone();
            response["description"] = json!(description);
            response
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors with their books",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "All authors ordered by id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthorPayload" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created; Location points at the new author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "400": with_description("Invalid body")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get one author",
                        "tags": ["Authors"],
                        "parameters": [id_param],
                        "responses": {
                            "200": {
                                "description": "The author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "404": with_description("Unknown author")
                        }
                    },
                    "put": {
                        "summary": "Update an author; absent fields are kept",
                        "tags": ["Authors"],
                        "parameters": [id_param],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthorPayload" }
                                }
                            }
                        },
                        "responses": {
                            "204": { "description": "Updated" },
                            "400": with_description("Invalid body"),
                            "404": with_description("Unknown author")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author and its books",
                        "tags": ["Authors"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": with_description("Unknown author")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" },
                            "books": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/BookSummary" }
                            }
                        },
                        "required": ["id", "firstName", "lastName", "books"]
                    },
                    "AuthorSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" }
                        },
                        "required": ["id", "firstName", "lastName"]
                    },
                    "AuthorPayload": {
                        "type": "object",
                        "properties": {
                            "firstName": { "type": "string", "maxLength": 255 },
                            "lastName": { "type": "string", "maxLength": 255 }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_author",
            up: r#"
                CREATE TABLE IF NOT EXISTS author (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name  TEXT NOT NULL
                )
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(AuthorsModule)
}
