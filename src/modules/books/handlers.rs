use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bookapi_authz::Role;
use bookapi_http::{ApiJson, ApiPath, ApiQuery, AppError};
use bookapi_kernel::AppContext;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryOrder, QuerySelect, Set,
};

use super::entity;
use super::models::{BookFields, BookPayload, BookView, ListBooksQuery};
use super::{invalidate_listings, list_cache_key, BOOKS_CACHE_TAG};
use crate::modules::authors::entity as author;
use crate::modules::users::CurrentUser;
use crate::validation::ensure_valid;

/// Paginated listing, served from the cache when possible.
///
/// The body is the cached JSON string, returned as stored.
pub async fn list_books(
    State(ctx): State<AppContext>,
    ApiQuery(query): ApiQuery<ListBooksQuery>,
) -> Result<Response, AppError> {
    let paging = &ctx.settings.pagination;
    let page = query.page.unwrap_or(paging.default_page);
    let limit = query.limit.unwrap_or(paging.default_limit);

    if page < 1 {
        return Err(AppError::bad_request("page must be at least 1"));
    }
    if limit < 1 || limit > paging.max_limit {
        return Err(AppError::bad_request(format!(
            "limit must be between 1 and {}",
            paging.max_limit
        )));
    }
    // The store binds offsets as signed 64-bit integers.
    let offset = (page - 1)
        .checked_mul(limit)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| AppError::bad_request("page out of range"))?;

    let db = ctx.db.clone();
    let body = ctx
        .cache
        .get_or_insert_with(&list_cache_key(page, limit), &[BOOKS_CACHE_TAG], async move {
            tracing::debug!(page, limit, "loading book page from the store");
            let rows = entity::Entity::find()
                .find_also_related(author::Entity)
                .order_by_asc(entity::Column::Id)
                .offset(offset)
                .limit(limit)
                .all(&db)
                .await?;
            let views: Vec<BookView> = rows
                .into_iter()
                .map(|(book, author)| BookView::new(book, author))
                .collect();
            Ok::<_, anyhow::Error>(serde_json::to_string(&views)?)
        })
        .await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn show_book(
    State(ctx): State<AppContext>,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiJson<BookView>, AppError> {
    let (book, author) = entity::Entity::find_by_id(id)
        .find_also_related(author::Entity)
        .one(&ctx.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))?;

    Ok(ApiJson(BookView::new(book, author)))
}

/// Admin only.
pub async fn create_book(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    ApiJson(payload): ApiJson<BookPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Role::Admin)?;

    let fields = BookFields::default().merge(&payload);
    ensure_valid(&fields, "book")?;
    let author = resolve_author(&ctx.db, payload.id_author).await?;

    let book = entity::ActiveModel {
        title: Set(fields.title),
        cover_text: Set(fields.cover_text),
        comment: Set(fields.comment),
        author_id: Set(author.as_ref().map(|author| author.id)),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await?;

    tracing::info!(book_id = book.id, created_by = %principal.email, "book created");
    invalidate_listings(&ctx)?;

    let location = ctx.resource_location(super::MODULE_NAME, book.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        ApiJson(BookView::new(book, author)),
    ))
}

pub async fn update_book(
    State(ctx): State<AppContext>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> Result<StatusCode, AppError> {
    let book = entity::Entity::find_by_id(id)
        .one(&ctx.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))?;

    let fields = BookFields::from(&book).merge(&payload);
    ensure_valid(&fields, "book")?;

    let mut active = book.into_active_model();
    active.title = Set(fields.title);
    active.cover_text = Set(fields.cover_text);
    active.comment = Set(fields.comment);
    if payload.id_author.is_some() {
        let author = resolve_author(&ctx.db, payload.id_author).await?;
        active.author_id = Set(author.map(|author| author.id));
    }
    active.update(&ctx.db).await?;

    tracing::info!(book_id = id, "book updated");
    invalidate_listings(&ctx)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_book(
    State(ctx): State<AppContext>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    let result = entity::Entity::delete_by_id(id).exec(&ctx.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(format!("book {id} not found")));
    }

    tracing::info!(book_id = id, "book deleted");
    invalidate_listings(&ctx)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unknown ids resolve to no author rather than an error.
async fn resolve_author<C: ConnectionTrait>(
    db: &C,
    id_author: Option<i32>,
) -> Result<Option<author::Model>, AppError> {
    let Some(id) = id_author else {
        return Ok(None);
    };

    let found = author::Entity::find_by_id(id).one(db).await?;
    if found.is_none() {
        tracing::warn!(id_author = id, "unknown author id, book stored without author");
    }
    Ok(found)
}
