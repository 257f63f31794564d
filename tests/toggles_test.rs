use bookcamp::db;
use bookcamp::services::reaction_service;
use bookcamp::services::ServiceError;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_user(db: &DatabaseConnection, username: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let user = bookcamp::models::user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set("hash".to_string()),
        is_manager: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    user.insert(db).await.expect("Failed to create user").id
}

async fn create_test_profile(db: &DatabaseConnection, user_id: i32) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let profile = bookcamp::models::profile::ActiveModel {
        user_id: Set(user_id),
        first_name: Set("Test".to_string()),
        last_name: Set("Reader".to_string()),
        description: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    profile.insert(db).await.expect("Failed to create profile").id
}

async fn create_test_topic(db: &DatabaseConnection, user_id: i32) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let topic = bookcamp::models::topic::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(None),
        title: Set("Test topic".to_string()),
        message: Set("What did everyone think?".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    topic.insert(db).await.expect("Failed to create topic").id
}

#[tokio::test]
async fn test_like_toggle_is_an_involution() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice").await;
    let topic_id = create_test_topic(&db, user_id).await;

    let first = reaction_service::toggle_like(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    assert!(first.selected);
    assert_eq!(first.likes_count, 1);

    let second = reaction_service::toggle_like(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    assert!(!second.selected);
    assert_eq!(second.likes_count, 0);

    // A third toggle lands back in the liked state.
    let third = reaction_service::toggle_like(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    assert!(third.selected);
    assert_eq!(third.likes_count, 1);
}

#[tokio::test]
async fn test_likes_from_different_users_accumulate() {
    let db = setup_test_db().await;
    let author_id = create_test_user(&db, "author").await;
    let reader_id = create_test_user(&db, "reader").await;
    let topic_id = create_test_topic(&db, author_id).await;

    reaction_service::toggle_like(&db, author_id, topic_id)
        .await
        .expect("toggle should succeed");
    let result = reaction_service::toggle_like(&db, reader_id, topic_id)
        .await
        .expect("toggle should succeed");

    assert!(result.selected);
    assert_eq!(result.likes_count, 2);

    // Un-liking by one user leaves the other's like in place.
    let result = reaction_service::toggle_like(&db, author_id, topic_id)
        .await
        .expect("toggle should succeed");
    assert!(!result.selected);
    assert_eq!(result.likes_count, 1);
}

#[tokio::test]
async fn test_like_on_unknown_topic_is_not_found() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "bob").await;

    let result = reaction_service::toggle_like(&db, user_id, 999).await;
    assert!(matches!(result, Err(ServiceError::NotFound)));
}

#[tokio::test]
async fn test_bookmark_toggle() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "carol").await;
    let topic_id = create_test_topic(&db, user_id).await;

    let selected = reaction_service::toggle_bookmark(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    assert!(selected);

    let selected = reaction_service::toggle_bookmark(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    assert!(!selected);
}

#[tokio::test]
async fn test_bookmark_and_like_are_independent() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "dave").await;
    let topic_id = create_test_topic(&db, user_id).await;

    reaction_service::toggle_like(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    reaction_service::toggle_bookmark(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");

    // Removing the bookmark keeps the like.
    reaction_service::toggle_bookmark(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    let like = reaction_service::toggle_like(&db, user_id, topic_id)
        .await
        .expect("toggle should succeed");
    assert!(!like.selected);
}

#[tokio::test]
async fn test_follow_toggle() {
    let db = setup_test_db().await;
    let follower_id = create_test_user(&db, "erin").await;
    let target_id = create_test_user(&db, "frank").await;
    create_test_profile(&db, target_id).await;

    let followed = reaction_service::toggle_follow(&db, follower_id, target_id)
        .await
        .expect("toggle should succeed");
    assert!(followed);

    let followed = reaction_service::toggle_follow(&db, follower_id, target_id)
        .await
        .expect("toggle should succeed");
    assert!(!followed);
}

#[tokio::test]
async fn test_follow_requires_a_completed_profile() {
    let db = setup_test_db().await;
    let follower_id = create_test_user(&db, "grace").await;
    let target_id = create_test_user(&db, "heidi").await;

    // The target exists but never filled in a profile.
    let result = reaction_service::toggle_follow(&db, follower_id, target_id).await;
    assert!(matches!(result, Err(ServiceError::NotFound)));
}

#[tokio::test]
async fn test_following_yourself_is_allowed() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "ivan").await;
    create_test_profile(&db, user_id).await;

    let followed = reaction_service::toggle_follow(&db, user_id, user_id)
        .await
        .expect("toggle should succeed");
    assert!(followed);
}
