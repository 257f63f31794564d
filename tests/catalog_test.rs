use bookcamp::db;
use bookcamp::models::shelf_entry::ShelfStatus;
use bookcamp::services::book_service::{self, NewBook};
use bookcamp::services::shelf_service::{self, EntryUpdate};
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

fn new_book(title: &str, isbn_10: &str, authors: Vec<String>) -> NewBook {
    NewBook {
        title: title.to_string(),
        publisher: None,
        year: Some(2020),
        language: Some("en".to_string()),
        isbn_10: isbn_10.to_string(),
        isbn_13: format!("978{}", isbn_10),
        cover_url: None,
        authors,
    }
}

async fn rate_book(db: &DatabaseConnection, profile_id: i32, book_id: i32, rating: i32) {
    shelf_service::add_book(db, profile_id, book_id, ShelfStatus::Read)
        .await
        .expect("add should succeed");
    shelf_service::update_entry(
        db,
        profile_id,
        book_id,
        EntryUpdate {
            rating: Some(rating),
            ..Default::default()
        },
    )
    .await
    .expect("rating should succeed");
}

#[tokio::test]
async fn test_average_rating_is_truncated() {
    let db = setup_test_db().await;
    let user_a = create_test_user(&db, "alice").await;
    let user_b = create_test_user(&db, "bob").await;
    let profile_a = create_test_profile(&db, user_a).await;
    let profile_b = create_test_profile(&db, user_b).await;

    let book = book_service::create_book(&db, new_book("Dune", "0441013597", vec![]))
        .await
        .expect("create should succeed");
    let book_id = book.id.expect("book id");

    rate_book(&db, profile_a, book_id, 80).await;
    rate_book(&db, profile_b, book_id, 85).await;

    let detail = book_service::get_book(&db, book_id)
        .await
        .expect("get should succeed");

    // 82.5 truncates down, it never rounds up.
    assert_eq!(detail.average_rating, Some(82));
    assert_eq!(detail.ratings_count, 2);
}

#[tokio::test]
async fn test_unrated_book_has_no_average() {
    let db = setup_test_db().await;
    let book = book_service::create_book(&db, new_book("Hyperion", "0553283685", vec![]))
        .await
        .expect("create should succeed");

    let detail = book_service::get_book(&db, book.id.expect("book id"))
        .await
        .expect("get should succeed");
    assert_eq!(detail.average_rating, None);
    assert_eq!(detail.ratings_count, 0);
}

#[tokio::test]
async fn test_duplicate_isbn_is_a_conflict() {
    let db = setup_test_db().await;
    book_service::create_book(&db, new_book("Solaris", "0156027607", vec![]))
        .await
        .expect("create should succeed");

    let result = book_service::create_book(&db, new_book("Solaris again", "0156027607", vec![])).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_author_names_are_deduplicated() {
    let db = setup_test_db().await;
    let first = book_service::create_book(
        &db,
        new_book("Ubik", "0547572298", vec!["Philip K. Dick".to_string()]),
    )
    .await
    .expect("create should succeed");
    let second = book_service::create_book(
        &db,
        new_book("Valis", "0547572417", vec!["Philip K. Dick".to_string()]),
    )
    .await
    .expect("create should succeed");

    assert_eq!(first.authors, vec!["Philip K. Dick".to_string()]);
    assert_eq!(second.authors, vec!["Philip K. Dick".to_string()]);

    let books = book_service::list_books(&db).await.expect("list");
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|b| b.authors == vec!["Philip K. Dick".to_string()]));
}
