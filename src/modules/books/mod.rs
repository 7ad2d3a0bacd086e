//! Books: CRUD over the `book` table plus a cached, paginated listing.
//!
//! Listing pages are cached under `getAllBooks-{page}-{limit}` and tagged
//! `booksCache`. Every write that can change a book view (book writes and
//! author updates or deletes) drops the whole tag.

pub mod entity;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookapi_cache::CacheError;
use bookapi_kernel::{AppContext, InitCtx, Migration, Module};
use serde_json::json;

pub const MODULE_NAME: &str = "books";

pub const BOOKS_CACHE_TAG: &str = "booksCache";

pub fn list_cache_key(page: u64, limit: u64) -> String {
    format!("getAllBooks-{page}-{limit}")
}

/// Drop every cached listing page.
pub fn invalidate_listings(ctx: &AppContext) -> Result<(), CacheError> {
    ctx.cache.invalidate_tags(&[BOOKS_CACHE_TAG])
}

pub struct BooksModule;

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let paging = &ctx.settings.pagination;
        if paging.default_limit < 1 || paging.default_limit > paging.max_limit {
            anyhow::bail!(
                "pagination.default_limit must be between 1 and {}",
                paging.max_limit
            );
        }
        if paging.default_page < 1 {
            anyhow::bail!("pagination.default_page must be at least 1");
        }

        tracing::info!(
            module = self.name(),
            default_limit = paging.default_limit,
            max_limit = paging.max_limit,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &AppContext) -> Router {
        Router::new()
            .route("/", get(handlers::list_books).post(handlers::create_book))
            .route(
                "/{id}",
                get(handlers::show_book)
                    .put(handlers::update_book)
                    .delete(handlers::delete_book),
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
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        });
        let payload = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookPayload" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books, one page at a time",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of books ordered by id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "400": error("Invalid paging parameters")
                        }
                    },
                    "post": {
                        "summary": "Create a book (ROLE_ADMIN)",
                        "tags": ["Books"],
                        "security": [{ "basicAuth": [] }],
                        "requestBody": payload,
                        "responses": {
                            "201": { "description": "Created; Location points at the new book", "content": book },
                            "400": error("Invalid body"),
                            "401": error("Missing or wrong credentials"),
                            "403": error("Caller is not an administrator")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get one book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": { "description": "The book", "content": book },
                            "404": error("Unknown book")
                        }
                    },
                    "put": {
                        "summary": "Update a book; absent fields are kept",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "requestBody": payload,
                        "responses": {
                            "204": { "description": "Updated" },
                            "400": error("Invalid body"),
                            "404": error("Unknown book")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error("Unknown book")
                        }
                    }
                }
            },
            "components": {
                "securitySchemes": {
                    "basicAuth": { "type": "http", "scheme": "basic" }
                },
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "coverText": { "type": "string" },
                            "comment": { "type": ["string", "null"] },
                            "author": {
                                "oneOf": [
                                    { "$ref": "#/components/schemas/AuthorSummary" },
                                    { "type": "null" }
                                ]
                            }
                        },
                        "required": ["id", "title", "coverText", "comment", "author"]
                    },
                    "BookSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "coverText": { "type": "string" },
                            "comment": { "type": ["string", "null"] }
                        },
                        "required": ["id", "title", "coverText", "comment"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 255 },
                            "coverText": { "type": "string" },
                            "comment": { "type": "string", "maxLength": 1000 },
                            "idAuthor": { "type": "integer" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_create_book",
                up: r#"
                    CREATE TABLE IF NOT EXISTS book (
                        id         INTEGER PRIMARY KEY AUTOINCREMENT,
                        title      TEXT NOT NULL,
                        cover_text TEXT NOT NULL,
                        comment    TEXT NULL,
                        author_id  INTEGER NULL REFERENCES author (id) ON DELETE CASCADE
                    )
                    "#,
            },
            Migration {
                id: "002_index_book_author",
                up: "CREATE INDEX IF NOT EXISTS book_author_id ON book (author_id)",
            },
        ]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule)
}
