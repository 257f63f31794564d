//! Book Service - catalog operations
//!
//! Books are shared entities: many shelf entries and topics point at the same
//! row, so deletion cascades through all of them.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, ModelTrait, PaginatorTrait, QueryFilter, Set, Statement, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::models::author::{self, Entity as Author};
use crate::models::book::{self, Book, Entity as BookEntity};
use crate::models::book_authors;
use crate::models::shelf_entry::{self, Entity as ShelfEntry, ShelfStatus};
use crate::models::topic::{self, Entity as Topic};

/// Input for creating a catalog entry.
#[derive(Debug, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub isbn_10: String,
    pub isbn_13: String,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// A book plus its activity aggregates, for the detail surface.
#[derive(Debug, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub average_rating: Option<i32>,
    pub ratings_count: u64,
    pub readers_count: u64,
    pub topics_count: u64,
    pub comments_count: i64,
}

#[derive(FromQueryResult)]
struct AvgRow {
    avg_rating: Option<f64>,
}

#[derive(FromQueryResult)]
struct CountRow {
    n: i64,
}

/// Create a book together with its authors. Author names are deduplicated
/// against the existing authors table; ISBN-10 collisions are conflicts.
pub async fn create_book(db: &DatabaseConnection, input: NewBook) -> Result<Book, ServiceError> {
    if input.title.trim().is_empty() {
        return Err(ServiceError::Validation("title must not be empty".into()));
    }
    if input.isbn_10.trim().is_empty() || input.isbn_13.trim().is_empty() {
        return Err(ServiceError::Validation(
            "isbn_10 and isbn_13 are required".into(),
        ));
    }

    let existing = BookEntity::find()
        .filter(book::Column::Isbn10.eq(input.isbn_10.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!(
            "a book with ISBN-10 {} is already catalogued",
            input.isbn_10
        )));
    }

    let txn = db.begin().await?;
    let now = Utc::now().to_rfc3339();

    let model = book::ActiveModel {
        title: Set(input.title),
        publisher: Set(input.publisher),
        year: Set(input.year),
        language: Set(input.language),
        isbn_10: Set(input.isbn_10),
        isbn_13: Set(input.isbn_13),
        cover_url: Set(input.cover_url),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut author_names = Vec::with_capacity(input.authors.len());
    for name in input.authors {
        let name = name.trim().to_string();
        if name.is_empty() {
            continue;
        }

        let author = match Author::find()
            .filter(author::Column::Name.eq(name.clone()))
            .one(&txn)
            .await?
        {
            Some(found) => found,
            None => {
                author::ActiveModel {
                    name: Set(name.clone()),
                    created_at: Set(now.clone()),
                    updated_at: Set(now.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        book_authors::ActiveModel {
            book_id: Set(model.id),
            author_id: Set(author.id),
        }
        .insert(&txn)
        .await?;
        author_names.push(author.name);
    }

    txn.commit().await?;
    tracing::info!("Catalogued book {} ({})", model.id, model.title);

    let mut dto = Book::from(model);
    dto.authors = author_names;
    Ok(dto)
}

/// List the whole catalog with author names attached.
pub async fn list_books(db: &DatabaseConnection) -> Result<Vec<Book>, ServiceError> {
    let rows = BookEntity::find().find_with_related(Author).all(db).await?;

    let books = rows
        .into_iter()
        .map(|(model, authors)| {
            let mut dto = Book::from(model);
            dto.authors = authors.into_iter().map(|a| a.name).collect();
            dto
        })
        .collect();
    Ok(books)
}

/// Fetch one book with its authors and activity aggregates.
pub async fn get_book(db: &DatabaseConnection, id: i32) -> Result<BookDetail, ServiceError> {
    let model = BookEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let authors = model.find_related(Author).all(db).await?;

    let avg = AvgRow::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        "SELECT AVG(rating) AS avg_rating FROM shelf_entries WHERE book_id = ? AND rating IS NOT NULL",
        [id.into()],
    ))
    .one(db)
    .await?
    .and_then(|row| row.avg_rating);

    let ratings_count = ShelfEntry::find()
        .filter(shelf_entry::Column::BookId.eq(id))
        .filter(shelf_entry::Column::Rating.is_not_null())
        .count(db)
        .await?;

    let readers_count = ShelfEntry::find()
        .filter(shelf_entry::Column::BookId.eq(id))
        .filter(shelf_entry::Column::Status.eq(ShelfStatus::Reading.as_str()))
        .count(db)
        .await?;

    let topics_count = Topic::find()
        .filter(topic::Column::BookId.eq(id))
        .count(db)
        .await?;

    let comments_count = CountRow::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        r#"
        SELECT COUNT(c.id) AS n
        FROM comments c
        INNER JOIN topics t ON c.topic_id = t.id
        WHERE t.book_id = ?
        "#,
        [id.into()],
    ))
    .one(db)
    .await?
    .map(|row| row.n)
    .unwrap_or(0);

    let mut dto = Book::from(model);
    dto.authors = authors.into_iter().map(|a| a.name).collect();

    Ok(BookDetail {
        book: dto,
        // Truncated, not rounded: 82.5 reports as 82.
        average_rating: avg.map(|v| v as i32),
        ratings_count,
        readers_count,
        topics_count,
        comments_count,
    })
}

/// Delete a book; shelf entries, topics and junction rows cascade away.
pub async fn delete_book(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let model = BookEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    model.delete(db).await?;
    Ok(())
}
