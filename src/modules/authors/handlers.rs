use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use bookapi_http::{ApiJson, ApiPath, AppError};
use bookapi_kernel::AppContext;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder, Set};

use super::entity;
use super::models::{AuthorFields, AuthorPayload, AuthorView};
use crate::modules::books::{self, entity as book};
use crate::validation::ensure_valid;

pub async fn list_authors(
    State(ctx): State<AppContext>,
) -> Result<ApiJson<Vec<AuthorView>>, AppError> {
    let authors = entity::Entity::find()
        .find_with_related(book::Entity)
        .order_by_asc(entity::Column::Id)
        .order_by_asc(book::Column::Id)
        .all(&ctx.db)
        .await?;

    Ok(ApiJson(
        authors
            .into_iter()
            .map(|(author, books)| AuthorView::new(author, books))
            .collect(),
    ))
}

pub async fn show_author(
    State(ctx): State<AppContext>,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiJson<AuthorView>, AppError> {
    let author = find_author(&ctx, id).await?;
    let books = author
        .find_related(book::Entity)
        .order_by_asc(book::Column::Id)
        .all(&ctx.db)
        .await?;

    Ok(ApiJson(AuthorView::new(author, books)))
}

pub async fn create_author(
    State(ctx): State<AppContext>,
    ApiJson(payload): ApiJson<AuthorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let fields = AuthorFields::default().merge(payload);
    ensure_valid(&fields, "author")?;

    let author = entity::ActiveModel {
        first_name: Set(fields.first_name),
        last_name: Set(fields.last_name),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await?;

    tracing::info!(author_id = author.id, "author created");
    let location = ctx.resource_location(super::MODULE_NAME, author.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        ApiJson(AuthorView::new(author, Vec::new())),
    ))
}

pub async fn update_author(
    State(ctx): State<AppContext>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<AuthorPayload>,
) -> Result<StatusCode, AppError> {
    let author = find_author(&ctx, id).await?;
    let fields = AuthorFields::from(&author).merge(payload);
    ensure_valid(&fields, "author")?;

    let mut active = author.into_active_model();
    active.first_name = Set(fields.first_name);
    active.last_name = Set(fields.last_name);
    active.update(&ctx.db).await?;

    tracing::info!(author_id = id, "author updated");
    books::invalidate_listings(&ctx)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_author(
    State(ctx): State<AppContext>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    let result = entity::Entity::delete_by_id(id).exec(&ctx.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(format!("author {id} not found")));
    }

    tracing::info!(author_id = id, "author deleted with its books");
    books::invalidate_listings(&ctx)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_author(ctx: &AppContext, id: i32) -> Result<entity::Model, AppError> {
    entity::Entity::find_by_id(id)
        .one(&ctx.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("author {id} not found")))
}
