use anyhow::Context;
use bookapi_authz::{hash_password, Role};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use super::entity;

/// Store a user with an argon2 hash of `password`.
pub async fn register_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
    roles: &[Role],
) -> anyhow::Result<entity::Model> {
    let hash = hash_password(password)?;
    let roles = serde_json::to_string(roles).context("failed to encode roles")?;

    let user = entity::ActiveModel {
        email: Set(email.to_string()),
        roles: Set(roles),
        password: Set(hash),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("failed to insert user {email}"))?;

    tracing::info!(user_id = user.id, email, "user registered");
    Ok(user)
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> anyhow::Result<Option<entity::Model>> {
    Ok(entity::Entity::find()
        .filter(entity::Column::Email.eq(email))
        .one(db)
        .await?)
}
