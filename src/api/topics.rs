use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::auth::Claims;
use crate::models::book::Entity as Book;
use crate::models::bookmark::{self, Entity as Bookmark};
use crate::models::comment::{self, Entity as Comment};
use crate::models::follow::{self, Entity as Follow};
use crate::models::like::{self, Entity as Like};
use crate::models::profile::{self, Entity as Profile};
use crate::models::topic::{self, Entity as Topic};
use crate::services::{profile_service, ServiceError};

const FEED_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    pub title: String,
    pub message: String,
}

async fn topic_with_counts(
    db: &DatabaseConnection,
    model: topic::Model,
) -> Result<topic::Topic, ServiceError> {
    let likes = Like::find()
        .filter(like::Column::TopicId.eq(model.id))
        .count(db)
        .await?;
    let bookmarks = Bookmark::find()
        .filter(bookmark::Column::TopicId.eq(model.id))
        .count(db)
        .await?;
    let comments = Comment::find()
        .filter(comment::Column::TopicId.eq(model.id))
        .count(db)
        .await?;

    let mut dto = topic::Topic::from(model);
    dto.likes_count = Some(likes);
    dto.bookmarks_count = Some(bookmarks);
    dto.comments_count = Some(comments);
    Ok(dto)
}

/// Topics published for a book, newest first.
pub async fn list_book_topics(
    State(db): State<DatabaseConnection>,
    Path(book_id): Path<i32>,
) -> impl IntoResponse {
    match Book::find_by_id(book_id).one(&db).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    }

    let topics = Topic::find()
        .filter(topic::Column::BookId.eq(book_id))
        .order_by_desc(topic::Column::Id)
        .all(&db)
        .await;

    match topics {
        Ok(models) => {
            let mut dtos = Vec::with_capacity(models.len());
            for model in models {
                match topic_with_counts(&db, model).await {
                    Ok(dto) => dtos.push(dto),
                    Err(e) => return error_response(e),
                }
            }
            (StatusCode::OK, Json(json!({ "topics": dtos }))).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// Publish a topic under a book. Requires a completed profile.
pub async fn create_topic(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(book_id): Path<i32>,
    Json(payload): Json<TopicRequest>,
) -> impl IntoResponse {
    if let Err(e) = profile_service::require_profile(&db, claims.uid).await {
        return error_response(e);
    }

    if payload.title.trim().is_empty() {
        return error_response(ServiceError::Validation("title must not be empty".into()));
    }

    match Book::find_by_id(book_id).one(&db).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_topic = topic::ActiveModel {
        user_id: Set(claims.uid),
        book_id: Set(Some(book_id)),
        title: Set(payload.title),
        message: Set(payload.message),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_topic.insert(&db).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(json!({ "topic": topic::Topic::from(model) })),
        )
            .into_response(),
        Err(e) => error_response(e.into()),
    }
}

pub async fn get_topic(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let model = match Topic::find_by_id(id).one(&db).await {
        Ok(Some(m)) => m,
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    };

    match topic_with_counts(&db, model).await {
        Ok(dto) => (StatusCode::OK, Json(json!({ "topic": dto }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Edit a topic. Owner only.
pub async fn update_topic(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<TopicRequest>,
) -> impl IntoResponse {
    let model = match Topic::find_by_id(id).one(&db).await {
        Ok(Some(m)) => m,
        Ok(None) => return error_response(ServiceError::NotFound),
        Err(e) => return error_response(e.into()),
    };

    if model.user_id != claims.uid {
        return error_response(ServiceError::Forbidden);
    }

    if payload.title.trim().is_empty() {
        return error_response(ServiceError::Validation("title must not be empty".into()));
    }

    let mut active: topic::ActiveModel = model.into();
    active.title = Set(payload.title);
    active.message = Set(payload.message);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => (
            StatusCode::OK,
            Json(json!({ "topic": topic::Topic::from(model) })),
        )
            .into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// Delete a topic. Owner only; comments and reactions cascade away.
pub async fn delete_topic(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let model = match Topic::find_by_id(id).one(&db).await {
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
            Json(json!({ "message": "Topic deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// The home feed: latest topics, narrowed to followed users once the caller
/// follows anyone.
pub async fn feed(State(db): State<DatabaseConnection>, claims: Claims) -> impl IntoResponse {
    let followed_profile_ids: Vec<i32> = match Follow::find()
        .filter(follow::Column::FollowerId.eq(claims.uid))
        .all(&db)
        .await
    {
        Ok(edges) => edges.into_iter().map(|e| e.profile_id).collect(),
        Err(e) => return error_response(e.into()),
    };

    let mut query = Topic::find();

    if !followed_profile_ids.is_empty() {
        let followed_user_ids: Vec<i32> = match Profile::find()
            .filter(profile::Column::Id.is_in(followed_profile_ids))
            .all(&db)
            .await
        {
            Ok(profiles) => profiles.into_iter().map(|p| p.user_id).collect(),
            Err(e) => return error_response(e.into()),
        };
        query = query.filter(topic::Column::UserId.is_in(followed_user_ids));
    }

    let topics = query
        .order_by_desc(topic::Column::Id)
        .limit(FEED_SIZE)
        .all(&db)
        .await;

    match topics {
        Ok(models) => {
            let dtos: Vec<topic::Topic> = models.into_iter().map(topic::Topic::from).collect();
            (StatusCode::OK, Json(json!({ "topics": dtos }))).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}
