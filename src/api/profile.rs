use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::error_response;
use crate::auth::Claims;
use crate::models::profile::Profile;
use crate::models::topic::Topic;
use crate::services::profile_service::{self, ProfileInput};

/// Complete the caller's onboarding by creating their profile.
pub async fn create_profile(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(input): Json<ProfileInput>,
) -> impl IntoResponse {
    match profile_service::create_profile(&db, claims.uid, input).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(json!({ "profile": Profile::from(model) })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Another user's profile page: profile data plus activity counters.
pub async fn get_profile(
    State(db): State<DatabaseConnection>,
    Path(user_id): Path<i32>,
) -> impl IntoResponse {
    match profile_service::get_profile(&db, user_id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_profile(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(input): Json<ProfileInput>,
) -> impl IntoResponse {
    match profile_service::update_profile(&db, claims.uid, input).await {
        Ok(model) => (
            StatusCode::OK,
            Json(json!({ "profile": Profile::from(model) })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_profile(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> impl IntoResponse {
    match profile_service::delete_profile(&db, claims.uid).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Profile deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Profiles the caller follows, most recent first.
pub async fn list_following(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> impl IntoResponse {
    match profile_service::followed_profiles(&db, claims.uid).await {
        Ok(models) => {
            let profiles: Vec<Profile> = models.into_iter().map(Profile::from).collect();
            (StatusCode::OK, Json(json!({ "profiles": profiles }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Topics the caller bookmarked, most recently saved first.
pub async fn list_bookmarks(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> impl IntoResponse {
    match profile_service::bookmarked_topics(&db, claims.uid).await {
        Ok(models) => {
            let topics: Vec<Topic> = models.into_iter().map(Topic::from).collect();
            (StatusCode::OK, Json(json!({ "topics": topics }))).into_response()
        }
        Err(e) => error_response(e),
    }
}
