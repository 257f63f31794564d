use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::error_response;
use crate::auth::Claims;
use crate::services::reaction_service;

/// Toggle the caller's like on a topic. Responds with the state after the
/// flip plus the refreshed count.
pub async fn toggle_like(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(topic_id): Path<i32>,
) -> impl IntoResponse {
    match reaction_service::toggle_like(&db, claims.uid, topic_id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "selected": result.selected,
                "likes_count": result.likes_count,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Toggle the caller's bookmark on a topic.
pub async fn toggle_bookmark(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(topic_id): Path<i32>,
) -> impl IntoResponse {
    match reaction_service::toggle_bookmark(&db, claims.uid, topic_id).await {
        Ok(selected) => (StatusCode::OK, Json(json!({ "selected": selected }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Toggle a follow towards another user's profile.
pub async fn toggle_follow(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(target_user_id): Path<i32>,
) -> impl IntoResponse {
    match reaction_service::toggle_follow(&db, claims.uid, target_user_id).await {
        Ok(followed) => (StatusCode::OK, Json(json!({ "followed": followed }))).into_response(),
        Err(e) => error_response(e),
    }
}
