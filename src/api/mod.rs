pub mod auth;
pub mod books;
pub mod comments;
pub mod health;
pub mod profile;
pub mod reactions;
pub mod shelf;
pub mod stats;
pub mod topics;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::services::ServiceError;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        .route("/auth/me", delete(auth::delete_me))
        // Catalog
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", get(books::get_book).delete(books::delete_book))
        // Topics
        .route(
            "/books/:id/topics",
            get(topics::list_book_topics).post(topics::create_topic),
        )
        .route(
            "/topics/:id",
            get(topics::get_topic)
                .put(topics::update_topic)
                .delete(topics::delete_topic),
        )
        // Comments
        .route(
            "/topics/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/comments/:id", delete(comments::delete_comment))
        // Reaction toggles
        .route("/topics/:id/like", post(reactions::toggle_like))
        .route("/topics/:id/bookmark", post(reactions::toggle_bookmark))
        .route("/users/:id/follow", post(reactions::toggle_follow))
        // Profiles
        .route("/profiles", post(profile::create_profile))
        .route(
            "/profiles/me",
            put(profile::update_profile).delete(profile::delete_profile),
        )
        .route("/users/:id/profile", get(profile::get_profile))
        .route("/me/following", get(profile::list_following))
        .route("/me/bookmarks", get(profile::list_bookmarks))
        // Shelf
        .route("/shelf", post(shelf::add_book))
        .route(
            "/shelf/:book_id",
            put(shelf::update_entry).delete(shelf::remove_book),
        )
        .route("/shelf/:book_id/status", patch(shelf::move_book))
        .route("/users/:id/shelf", get(shelf::list_shelf))
        // Feed & statistics
        .route("/feed", get(topics::feed))
        .route("/stats", get(stats::get_stats))
        .with_state(db)
}

/// Map a service failure onto the HTTP surface. Database errors are logged
/// and hidden behind a generic 500.
pub(crate) fn error_response(err: ServiceError) -> Response {
    match err {
        ServiceError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Resource not found" })),
        )
            .into_response(),
        ServiceError::Conflict(msg) => {
            (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
        }
        ServiceError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        ServiceError::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Forbidden" })),
        )
            .into_response(),
        ServiceError::Database(msg) => {
            tracing::error!("Database error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}
