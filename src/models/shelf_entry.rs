use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reading status of a shelf entry. Any status is reachable from any other;
/// consistency of the dependent fields is restored by
/// `services::shelf_service::normalize` on every write.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShelfStatus {
    ToRead,
    Reading,
    Read,
}

impl ShelfStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfStatus::ToRead => "TO_READ",
            ShelfStatus::Reading => "READING",
            ShelfStatus::Read => "READ",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TO_READ" => Some(ShelfStatus::ToRead),
            "READING" => Some(ShelfStatus::Reading),
            "READ" => Some(ShelfStatus::Read),
            _ => None,
        }
    }

    /// Human-readable label, as surfaced in shelf mutation responses.
    pub fn verbose(&self) -> &'static str {
        match self {
            ShelfStatus::ToRead => "To read",
            ShelfStatus::Reading => "Reading",
            ShelfStatus::Read => "Read",
        }
    }
}

impl Default for ShelfStatus {
    fn default() -> Self {
        ShelfStatus::Read
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shelf_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub profile_id: i32,
    pub book_id: Option<i32>,
    #[sea_orm(default_value = "READ")]
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rating: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Profile,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> ShelfStatus {
        ShelfStatus::parse(&self.status).unwrap_or_default()
    }
}

// DTO for API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ShelfEntry {
    pub id: i32,
    pub book_id: Option<i32>,
    pub status: ShelfStatus,
    pub verbose_status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rating: Option<i32>,
    pub updated_at: String,
}

impl From<Model> for ShelfEntry {
    fn from(model: Model) -> Self {
        let status = model.status();
        Self {
            id: model.id,
            book_id: model.book_id,
            status,
            verbose_status: status.verbose().to_string(),
            start_date: model.start_date,
            end_date: model.end_date,
            rating: model.rating,
            updated_at: model.updated_at,
        }
    }
}
