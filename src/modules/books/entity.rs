use sea_orm::entity::prelude::*;

use crate::modules::authors::entity as author;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub cover_text: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub author_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "author::Entity",
        from = "Column::AuthorId",
        to = "author::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
