use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;

use super::error_response;
use crate::auth::Claims;
use crate::models::user::Entity as User;
use crate::services::book_service::{self, NewBook};

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "List of catalogued books")
    )
)]
pub async fn list_books(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match book_service::list_books(&db).await {
        Ok(books) => {
            let total = books.len();
            (StatusCode::OK, Json(json!({ "books": books, "total": total }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book catalogued"),
        (status = 409, description = "ISBN already catalogued")
    )
)]
pub async fn create_book(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Json(input): Json<NewBook>,
) -> impl IntoResponse {
    match book_service::create_book(&db, input).await {
        Ok(book) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Book created successfully", "book": book })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match book_service::get_book(&db, id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Catalog curation is reserved to managers.
pub async fn delete_book(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let is_manager = matches!(
        User::find_by_id(claims.uid).one(&db).await,
        Ok(Some(u)) if u.is_manager
    );
    if !is_manager {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Forbidden" })),
        )
            .into_response();
    }

    match book_service::delete_book(&db, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Book deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
