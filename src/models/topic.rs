use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub book_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
    #[sea_orm(has_many = "super::like::Entity")]
    Likes,
    #[sea_orm(has_many = "super::bookmark::Entity")]
    Bookmarks,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::bookmark::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmarks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses, counts filled in by the topic handlers
#[derive(Debug, Serialize, Deserialize)]
pub struct Topic {
    pub id: i32,
    pub user_id: i32,
    pub book_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmarks_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<u64>,
}

impl From<Model> for Topic {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            book_id: model.book_id,
            title: model.title,
            message: model.message,
            created_at: model.created_at,
            likes_count: None,
            bookmarks_count: None,
            comments_count: None,
        }
    }
}
