use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::error_response;
use crate::services::stats_service;

const TOP_N: u64 = 5;

/// The statistics surface: top books by topics, top users by topics and by
/// comments. Rankings are deterministic (count DESC, id ASC).
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Popularity rankings")
    )
)]
pub async fn get_stats(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let top_books = match stats_service::top_books(&db, TOP_N).await {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };

    let top_users_by_topics = match stats_service::top_users_by_topics(&db, TOP_N).await {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };

    let top_users_by_comments = match stats_service::top_users_by_comments(&db, TOP_N).await {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };

    (
        StatusCode::OK,
        Json(json!({
            "top_books": top_books,
            "top_users_by_topics": top_users_by_topics,
            "top_users_by_comments": top_users_by_comments,
        })),
    )
        .into_response()
}
