use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::auth::Claims;
use crate::models::profile::{self, Entity as Profile};
use crate::models::shelf_entry::{ShelfEntry, ShelfStatus};
use crate::services::shelf_service::{self, EntryUpdate};
use crate::services::{profile_service, ServiceError};

#[derive(Debug, Deserialize)]
pub struct AddBookRequest {
    pub book_id: i32,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveBookRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ShelfQuery {
    pub status: Option<String>,
}

fn parse_status(value: &str) -> Result<ShelfStatus, ServiceError> {
    ShelfStatus::parse(value).ok_or_else(|| {
        ServiceError::Validation(format!(
            "unknown status '{}', expected TO_READ, READING or READ",
            value
        ))
    })
}

/// Add a book to the caller's shelf with an initial status.
pub async fn add_book(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<AddBookRequest>,
) -> impl IntoResponse {
    let profile = match profile_service::require_profile(&db, claims.uid).await {
        Ok(p) => p,
        Err(e) => return error_response(e),
    };

    let status = match parse_status(&payload.status) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match shelf_service::add_book(&db, profile.id, payload.book_id, status).await {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(json!({
                "book_id": payload.book_id,
                "status": entry.status().verbose(),
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Move a shelved book to a different status.
pub async fn move_book(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(book_id): Path<i32>,
    Json(payload): Json<MoveBookRequest>,
) -> impl IntoResponse {
    let profile = match profile_service::require_profile(&db, claims.uid).await {
        Ok(p) => p,
        Err(e) => return error_response(e),
    };

    let status = match parse_status(&payload.status) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match shelf_service::move_book(&db, profile.id, book_id, status).await {
        Ok(entry) => (
            StatusCode::OK,
            Json(json!({
                "book_id": book_id,
                "status": entry.status().verbose(),
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Edit the dates/rating of a shelf entry. Fields the current status
/// disallows are discarded by normalization, not rejected.
pub async fn update_entry(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(book_id): Path<i32>,
    Json(payload): Json<UpdateEntryRequest>,
) -> impl IntoResponse {
    let profile = match profile_service::require_profile(&db, claims.uid).await {
        Ok(p) => p,
        Err(e) => return error_response(e),
    };

    let update = EntryUpdate {
        start_date: payload.start_date,
        end_date: payload.end_date,
        rating: payload.rating,
    };

    match shelf_service::update_entry(&db, profile.id, book_id, update).await {
        Ok(entry) => (StatusCode::OK, Json(ShelfEntry::from(entry))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Take a book off the caller's shelf.
pub async fn remove_book(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(book_id): Path<i32>,
) -> impl IntoResponse {
    let profile = match profile_service::require_profile(&db, claims.uid).await {
        Ok(p) => p,
        Err(e) => return error_response(e),
    };

    match shelf_service::remove_book(&db, profile.id, book_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "id": book_id, "status": "deleted" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// A user's shelf, most recently updated first, optionally filtered by status.
pub async fn list_shelf(
    State(db): State<DatabaseConnection>,
    Path(user_id): Path<i32>,
    Query(query): Query<ShelfQuery>,
) -> impl IntoResponse {
    let profile = match Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(&db)
        .await
    {
        Ok(Some(p)) => p,
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    };

    let status = match query.status.as_deref().map(parse_status).transpose() {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match shelf_service::list_shelf(&db, profile.id, status).await {
        Ok(entries) => {
            let entries: Vec<ShelfEntry> = entries.into_iter().map(ShelfEntry::from).collect();
            let total = entries.len();
            (
                StatusCode::OK,
                Json(json!({ "entries": entries, "total": total })),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}
