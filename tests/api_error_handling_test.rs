use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bookcamp::auth;
use bookcamp::db;
use bookcamp::server;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt; // for `oneshot`

async fn setup_test_app() -> (Router, DatabaseConnection) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let app = server::build_router(db.clone(), &[]);
    (app, db)
}

async fn create_test_user(db: &DatabaseConnection, username: &str, is_manager: bool) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let user = bookcamp::models::user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set(auth::hash_password("secret").expect("hash")),
        is_manager: Set(is_manager),
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

async fn create_test_book(db: &DatabaseConnection, title: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let book = bookcamp::models::book::ActiveModel {
        title: Set(title.to_string()),
        publisher: Set(None),
        year: Set(None),
        language: Set(None),
        isbn_10: Set("0441013597".to_string()),
        isbn_13: Set("9780441013593".to_string()),
        cover_url: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    book.insert(db).await.expect("Failed to create book").id
}

fn token_for(user_id: i32, username: &str) -> String {
    auth::create_jwt(user_id, username).expect("Failed to create token")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

#[tokio::test]
async fn test_get_unknown_book_is_404() {
    let (app, _db) = setup_test_app().await;

    let req = Request::builder()
        .uri("/api/books/999")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shelf_requires_authentication() {
    let (app, _db) = setup_test_app().await;

    let req = json_request(
        "POST",
        "/api/shelf",
        None,
        serde_json::json!({ "book_id": 1, "status": "READ" }),
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_shelf_requires_a_completed_profile() {
    let (app, db) = setup_test_app().await;
    let user_id = create_test_user(&db, "newcomer", false).await;
    let book_id = create_test_book(&db, "Dune").await;
    let token = token_for(user_id, "newcomer");

    let req = json_request(
        "POST",
        "/api/shelf",
        Some(&token),
        serde_json::json!({ "book_id": book_id, "status": "READ" }),
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_shelf_rejects_unknown_status() {
    let (app, db) = setup_test_app().await;
    let user_id = create_test_user(&db, "alice", false).await;
    create_test_profile(&db, user_id).await;
    let book_id = create_test_book(&db, "Dune").await;
    let token = token_for(user_id, "alice");

    let req = json_request(
        "POST",
        "/api/shelf",
        Some(&token),
        serde_json::json!({ "book_id": book_id, "status": "DONE" }),
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shelf_duplicate_add_is_409() {
    let (app, db) = setup_test_app().await;
    let user_id = create_test_user(&db, "bob", false).await;
    create_test_profile(&db, user_id).await;
    let book_id = create_test_book(&db, "Hyperion").await;
    let token = token_for(user_id, "bob");

    let payload = serde_json::json!({ "book_id": book_id, "status": "TO_READ" });

    let req = json_request("POST", "/api/shelf", Some(&token), payload.clone());
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = json_request("POST", "/api/shelf", Some(&token), payload);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_shelf_move_reports_verbose_status() {
    let (app, db) = setup_test_app().await;
    let user_id = create_test_user(&db, "carol", false).await;
    create_test_profile(&db, user_id).await;
    let book_id = create_test_book(&db, "Solaris").await;
    let token = token_for(user_id, "carol");

    let req = json_request(
        "POST",
        "/api/shelf",
        Some(&token),
        serde_json::json!({ "book_id": book_id, "status": "TO_READ" }),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = json_request(
        "PATCH",
        &format!("/api/shelf/{}/status", book_id),
        Some(&token),
        serde_json::json!({ "status": "READING" }),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "Reading");
}

#[tokio::test]
async fn test_register_duplicate_username_is_409() {
    let (app, _db) = setup_test_app().await;

    let payload = serde_json::json!({
        "username": "newuser",
        "email": "newuser@example.com",
        "password": "secret"
    });

    let req = json_request("POST", "/api/auth/register", None, payload.clone());
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = json_request("POST", "/api/auth/register", None, payload);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_401() {
    let (app, db) = setup_test_app().await;
    create_test_user(&db, "dave", false).await;

    let req = json_request(
        "POST",
        "/api/auth/login",
        None,
        serde_json::json!({ "username": "dave", "password": "wrong" }),
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_returns_a_usable_token() {
    let (app, db) = setup_test_app().await;
    create_test_user(&db, "erin", false).await;

    let req = json_request(
        "POST",
        "/api/auth/login",
        None,
        serde_json::json!({ "username": "erin", "password": "secret" }),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let token = body["token"].as_str().expect("token in response");

    let req = Request::builder()
        .uri("/api/auth/me")
        .method("GET")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["user"]["username"], "erin");
}

#[tokio::test]
async fn test_delete_book_is_manager_only() {
    let (app, db) = setup_test_app().await;
    let user_id = create_test_user(&db, "frank", false).await;
    let book_id = create_test_book(&db, "Ubik").await;
    let token = token_for(user_id, "frank");

    let req = Request::builder()
        .uri(format!("/api/books/{}", book_id))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let manager_id = create_test_user(&db, "boss", true).await;
    let token = token_for(manager_id, "boss");
    let req = Request::builder()
        .uri(format!("/api/books/{}", book_id))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_only_the_author_deletes_a_topic() {
    let (app, db) = setup_test_app().await;
    let author_id = create_test_user(&db, "author", false).await;
    create_test_profile(&db, author_id).await;
    let other_id = create_test_user(&db, "other", false).await;
    create_test_profile(&db, other_id).await;
    let book_id = create_test_book(&db, "Blindsight").await;

    let token = token_for(author_id, "author");
    let req = json_request(
        "POST",
        &format!("/api/books/{}/topics", book_id),
        Some(&token),
        serde_json::json!({ "title": "First impressions", "message": "Thoughts?" }),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let topic_id = body["topic"]["id"].as_i64().expect("topic id");

    let other_token = token_for(other_id, "other");
    let req = Request::builder()
        .uri(format!("/api/topics/{}", topic_id))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", other_token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let req = Request::builder()
        .uri(format!("/api/topics/{}", topic_id))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_follow_toggle_reports_state() {
    let (app, db) = setup_test_app().await;
    let follower_id = create_test_user(&db, "grace", false).await;
    let target_id = create_test_user(&db, "heidi", false).await;
    create_test_profile(&db, target_id).await;
    let token = token_for(follower_id, "grace");

    let req = json_request(
        "POST",
        &format!("/api/users/{}/follow", target_id),
        Some(&token),
        serde_json::json!({}),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["followed"], true);

    let req = json_request(
        "POST",
        &format!("/api/users/{}/follow", target_id),
        Some(&token),
        serde_json::json!({}),
    );
    let response = app.oneshot(req).await.unwrap();
    let body = response_json(response).await;
    assert_eq!(body["followed"], false);
}

#[tokio::test]
async fn test_stats_shape() {
    let (app, db) = setup_test_app().await;
    let user_id = create_test_user(&db, "ivan", false).await;
    create_test_profile(&db, user_id).await;
    create_test_book(&db, "Anathem").await;

    let req = Request::builder()
        .uri("/api/stats")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["top_books"].is_array());
    assert!(body["top_users_by_topics"].is_array());
    assert!(body["top_users_by_comments"].is_array());
}
