use crate::auth::{create_jwt, hash_password, verify_password, Claims};
use crate::models::user::{self, Entity as User};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

pub async fn register(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if payload.username.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "username, email and password are required" })),
        )
            .into_response();
    }

    let taken = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(payload.username.clone()))
                .add(user::Column::Email.eq(payload.email.clone())),
        )
        .one(&db)
        .await;

    match taken {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "username or email already in use" })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Registration lookup failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response();
        }
        Ok(None) => {}
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response();
        }
    };

    let now = chrono::Utc::now().to_rfc3339();
    let new_user = user::ActiveModel {
        username: Set(payload.username),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        is_manager: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_user.insert(&db).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User created",
                "user": user::User::from(model)
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for user: {}", payload.username);

    let found = match User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&db)
        .await
    {
        Ok(Some(u)) => u,
        _ => {
            tracing::warn!("User not found: {}", payload.username);
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response();
        }
    };

    match verify_password(&payload.password, &found.password_hash) {
        Ok(true) => match create_jwt(found.id, &found.username) {
            Ok(token) => (StatusCode::OK, Json(json!({ "token": token }))).into_response(),
            Err(e) => {
                tracing::error!("Token creation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        },
        _ => {
            tracing::warn!("Password verification failed for user: {}", found.username);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response()
        }
    }
}

pub async fn get_me(State(db): State<DatabaseConnection>, claims: Claims) -> impl IntoResponse {
    match User::find_by_id(claims.uid).one(&db).await {
        Ok(Some(model)) => {
            (StatusCode::OK, Json(json!({ "user": user::User::from(model) }))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Resource not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Delete the calling user. Profile, topics, comments, reactions, follows and
/// shelf entries cascade away with the row.
pub async fn delete_me(State(db): State<DatabaseConnection>, claims: Claims) -> impl IntoResponse {
    match User::delete_by_id(claims.uid).exec(&db).await {
        Ok(res) if res.rows_affected > 0 => (
            StatusCode::OK,
            Json(json!({ "message": "User deleted" })),
        )
            .into_response(),
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Resource not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
