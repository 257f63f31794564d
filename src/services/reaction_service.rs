//! Reaction Service - like/bookmark/follow toggles
//!
//! Each toggle is a check-then-act pair wrapped in a single transaction, so
//! concurrent duplicate toggles serialize instead of tripping the uniqueness
//! constraint.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};

use super::ServiceError;
use crate::models::bookmark::{self, Entity as Bookmark};
use crate::models::follow::{self, Entity as Follow};
use crate::models::like::{self, Entity as Like};
use crate::models::profile::{self, Entity as Profile};
use crate::models::topic::Entity as Topic;

/// Result of a like toggle: the new state plus the refreshed count.
#[derive(Debug, Clone, Copy)]
pub struct LikeToggle {
    pub selected: bool,
    pub likes_count: u64,
}

/// Toggle a like for (user, topic). Returns the state after the operation.
pub async fn toggle_like(
    db: &DatabaseConnection,
    user_id: i32,
    topic_id: i32,
) -> Result<LikeToggle, ServiceError> {
    let txn = db.begin().await?;

    Topic::find_by_id(topic_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let existing = Like::find()
        .filter(like::Column::UserId.eq(user_id))
        .filter(like::Column::TopicId.eq(topic_id))
        .one(&txn)
        .await?;

    let selected = match existing {
        Some(row) => {
            row.delete(&txn).await?;
            false
        }
        None => {
            like::ActiveModel {
                user_id: Set(user_id),
                topic_id: Set(topic_id),
                created_at: Set(Utc::now().to_rfc3339()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            true
        }
    };

    let likes_count = Like::find()
        .filter(like::Column::TopicId.eq(topic_id))
        .count(&txn)
        .await?;

    txn.commit().await?;

    Ok(LikeToggle {
        selected,
        likes_count,
    })
}

/// Toggle a bookmark for (user, topic).
pub async fn toggle_bookmark(
    db: &DatabaseConnection,
    user_id: i32,
    topic_id: i32,
) -> Result<bool, ServiceError> {
    let txn = db.begin().await?;

    Topic::find_by_id(topic_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let existing = Bookmark::find()
        .filter(bookmark::Column::UserId.eq(user_id))
        .filter(bookmark::Column::TopicId.eq(topic_id))
        .one(&txn)
        .await?;

    let selected = match existing {
        Some(row) => {
            row.delete(&txn).await?;
            false
        }
        None => {
            bookmark::ActiveModel {
                user_id: Set(user_id),
                topic_id: Set(topic_id),
                created_at: Set(Utc::now().to_rfc3339()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            true
        }
    };

    txn.commit().await?;
    Ok(selected)
}

/// Toggle a follow edge from `follower_id` towards the profile of
/// `target_user_id`. The target must have completed a profile.
/// Following yourself is not prevented.
pub async fn toggle_follow(
    db: &DatabaseConnection,
    follower_id: i32,
    target_user_id: i32,
) -> Result<bool, ServiceError> {
    let txn = db.begin().await?;

    let target_profile = Profile::find()
        .filter(profile::Column::UserId.eq(target_user_id))
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let existing = Follow::find()
        .filter(follow::Column::FollowerId.eq(follower_id))
        .filter(follow::Column::ProfileId.eq(target_profile.id))
        .one(&txn)
        .await?;

    let followed = match existing {
        Some(edge) => {
            edge.delete(&txn).await?;
            false
        }
        None => {
            follow::ActiveModel {
                follower_id: Set(follower_id),
                profile_id: Set(target_profile.id),
                created_at: Set(Utc::now().to_rfc3339()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            true
        }
    };

    txn.commit().await?;
    Ok(followed)
}
