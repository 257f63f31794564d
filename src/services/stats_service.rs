//! Stats Service - fixed-size popularity rankings
//!
//! Read-only projections. Ties are broken by lowest id so results are
//! reproducible regardless of the query engine's internal ordering.

use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement};
use serde::Serialize;

use super::ServiceError;

#[derive(Debug, FromQueryResult, Serialize)]
pub struct BookRanking {
    pub id: i32,
    pub title: String,
    pub topics_count: i64,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct UserTopicRanking {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub topics_count: i64,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct UserCommentRanking {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub comments_count: i64,
}

/// Books ranked by number of published topics.
pub async fn top_books(
    db: &DatabaseConnection,
    n: u64,
) -> Result<Vec<BookRanking>, ServiceError> {
    let rows = BookRanking::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        r#"
        SELECT b.id, b.title, COUNT(t.id) AS topics_count
        FROM books b
        LEFT JOIN topics t ON t.book_id = b.id
        GROUP BY b.id
        ORDER BY topics_count DESC, b.id ASC
        LIMIT ?
        "#,
        [(n as i64).into()],
    ))
    .all(db)
    .await?;
    Ok(rows)
}

/// Users ranked by number of published topics. Only users with a completed
/// profile participate.
pub async fn top_users_by_topics(
    db: &DatabaseConnection,
    n: u64,
) -> Result<Vec<UserTopicRanking>, ServiceError> {
    let rows = UserTopicRanking::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        r#"
        SELECT u.id, u.username, p.first_name, p.last_name, COUNT(t.id) AS topics_count
        FROM users u
        INNER JOIN profiles p ON p.user_id = u.id
        LEFT JOIN topics t ON t.user_id = u.id
        GROUP BY u.id
        ORDER BY topics_count DESC, u.id ASC
        LIMIT ?
        "#,
        [(n as i64).into()],
    ))
    .all(db)
    .await?;
    Ok(rows)
}

/// Users ranked by number of published comments, profile-complete users only.
pub async fn top_users_by_comments(
    db: &DatabaseConnection,
    n: u64,
) -> Result<Vec<UserCommentRanking>, ServiceError> {
    let rows = UserCommentRanking::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        r#"
        SELECT u.id, u.username, p.first_name, p.last_name, COUNT(c.id) AS comments_count
        FROM users u
        INNER JOIN profiles p ON p.user_id = u.id
        LEFT JOIN comments c ON c.user_id = u.id
        GROUP BY u.id
        ORDER BY comments_count DESC, u.id ASC
        LIMIT ?
        "#,
        [(n as i64).into()],
    ))
    .all(db)
    .await?;
    Ok(rows)
}
