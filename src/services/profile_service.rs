//! Profile Service - profile lifecycle and the per-user social surfaces

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, ModelTrait, PaginatorTrait, QueryFilter, Set, Statement,
};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::models::bookmark::{self, Entity as Bookmark};
use crate::models::comment::{self, Entity as Comment};
use crate::models::follow::{self, Entity as Follow};
use crate::models::like::{self, Entity as Like};
use crate::models::profile::{self, Entity as Profile};
use crate::models::shelf_entry::{self, Entity as ShelfEntry};
use crate::models::topic::{self, Entity as Topic};
use crate::models::user::Entity as User;

#[derive(Debug, Deserialize)]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub description: Option<String>,
}

/// A profile with its owner's activity counters, for the profile page.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: profile::Profile,
    pub username: String,
    pub books_count: u64,
    pub topics_count: u64,
    pub comments_count: u64,
    pub likes_count: u64,
    pub bookmarks_count: u64,
    pub followers_count: u64,
}

/// The profile of `user_id`, or `Forbidden` when onboarding is incomplete.
/// Shelf and topic mutations go through this gate.
pub async fn require_profile(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<profile::Model, ServiceError> {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(ServiceError::Forbidden)
}

/// Complete a user's onboarding. A user gets exactly one profile.
pub async fn create_profile(
    db: &DatabaseConnection,
    user_id: i32,
    input: ProfileInput,
) -> Result<profile::Model, ServiceError> {
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "first_name and last_name must not be empty".into(),
        ));
    }

    let existing = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(
            "profile already completed".into(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let model = profile::ActiveModel {
        user_id: Set(user_id),
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        description: Set(input.description),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Profile completed for user {}", user_id);
    Ok(model)
}

/// Fetch the profile page data for a user.
pub async fn get_profile(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<ProfileView, ServiceError> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let model = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let books_count = ShelfEntry::find()
        .filter(shelf_entry::Column::ProfileId.eq(model.id))
        .count(db)
        .await?;
    let topics_count = Topic::find()
        .filter(topic::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let comments_count = Comment::find()
        .filter(comment::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let likes_count = Like::find()
        .filter(like::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let bookmarks_count = Bookmark::find()
        .filter(bookmark::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let followers_count = Follow::find()
        .filter(follow::Column::ProfileId.eq(model.id))
        .count(db)
        .await?;

    Ok(ProfileView {
        profile: model.into(),
        username: user.username,
        books_count,
        topics_count,
        comments_count,
        likes_count,
        bookmarks_count,
        followers_count,
    })
}

/// Update the caller's own profile.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i32,
    input: ProfileInput,
) -> Result<profile::Model, ServiceError> {
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "first_name and last_name must not be empty".into(),
        ));
    }

    let model = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: profile::ActiveModel = model.into();
    active.first_name = Set(input.first_name.trim().to_string());
    active.last_name = Set(input.last_name.trim().to_string());
    active.description = Set(input.description);
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Delete the caller's own profile; shelf entries and follower edges cascade.
pub async fn delete_profile(db: &DatabaseConnection, user_id: i32) -> Result<(), ServiceError> {
    let model = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    model.delete(db).await?;
    Ok(())
}

/// Profiles the user follows, most recently followed first.
pub async fn followed_profiles(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<profile::Model>, ServiceError> {
    let rows = profile::Model::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        r#"
        SELECT p.*
        FROM profiles p
        INNER JOIN follows f ON f.profile_id = p.id
        WHERE f.follower_id = ?
        ORDER BY f.created_at DESC
        "#,
        [user_id.into()],
    ))
    .all(db)
    .await?;
    Ok(rows)
}

/// Topics the user bookmarked, most recently bookmarked first.
pub async fn bookmarked_topics(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<topic::Model>, ServiceError> {
    let rows = topic::Model::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        r#"
        SELECT t.*
        FROM topics t
        INNER JOIN bookmarks b ON b.topic_id = t.id
        WHERE b.user_id = ?
        ORDER BY b.created_at DESC
        "#,
        [user_id.into()],
    ))
    .all(db)
    .await?;
    Ok(rows)
}
