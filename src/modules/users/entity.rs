use bookapi_authz::Role;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    /// JSON array of role tags, e.g. `["ROLE_ADMIN"]`.
    #[sea_orm(column_type = "Text")]
    pub roles: String,
    /// Argon2id PHC string.
    pub password: String,
}

impl Model {
    pub fn roles(&self) -> Vec<Role> {
        serde_json::from_str(&self.roles).unwrap_or_else(|err| {
            tracing::warn!(
                user_id = self.id,
                error = %err,
                "unreadable roles column, treating as empty"
            );
            Vec::new()
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
