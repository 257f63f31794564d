use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::auth::Claims;
use crate::models::comment::{self, Entity as Comment};
use crate::models::topic::Entity as Topic;
use crate::services::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub message: String,
}

/// Comments under a topic, oldest first.
pub async fn list_comments(
    State(db): State<DatabaseConnection>,
    Path(topic_id): Path<i32>,
) -> impl IntoResponse {
    match Topic::find_by_id(topic_id).one(&db).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    }

    let comments = Comment::find()
        .filter(comment::Column::TopicId.eq(topic_id))
        .order_by_asc(comment::Column::Id)
        .all(&db)
        .await;

    match comments {
        Ok(models) => (StatusCode::OK, Json(json!({ "comments": models }))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

pub async fn create_comment(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(topic_id): Path<i32>,
    Json(payload): Json<CommentRequest>,
) -> impl IntoResponse {
    if payload.message.trim().is_empty() {
        return error_response(ServiceError::Validation("message must not be empty".into()));
    }

    match Topic::find_by_id(topic_id).one(&db).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    }

    let new_comment = comment::ActiveModel {
        user_id: Set(claims.uid),
        topic_id: Set(Some(topic_id)),
        message: Set(payload.message),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    match new_comment.insert(&db).await {
        Ok(model) => (StatusCode::CREATED, Json(json!({ "comment": model }))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// Delete a comment. Owner only.
pub async fn delete_comment(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let model = match Comment::find_by_id(id).one(&db).await {
        Ok(Some(m)) => m,
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    };

    if model.user_id != claims.uid {
        return error_response(ServiceError::Forbidden);
    }

    match model.delete(&db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Comment deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e.into()),
    }
}
