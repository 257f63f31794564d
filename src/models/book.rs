use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub isbn_10: String,
    pub isbn_13: String,
    pub cover_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shelf_entry::Entity")]
    ShelfEntries,
    #[sea_orm(has_many = "super::topic::Entity")]
    Topics,
}

impl Related<super::shelf_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShelfEntries.def()
    }
}

impl Related<super::topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Topics.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses, authors flattened to a name list
#[derive(Debug, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<i32>,
    pub title: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub isbn_10: String,
    pub isbn_13: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            title: model.title,
            publisher: model.publisher,
            year: model.year,
            language: model.language,
            isbn_10: model.isbn_10,
            isbn_13: model.isbn_13,
            cover_url: model.cover_url,
            authors: Vec::new(),
        }
    }
}
