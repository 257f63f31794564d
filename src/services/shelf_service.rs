//! Shelf Service - the per-(profile, book) reading record state machine
//!
//! Whatever status an entry ends up in, `normalize` restores the dependent
//! fields (dates, rating) to match it. The rules run on every write, so a
//! record is consistent no matter how the mutation was requested.

use chrono::{Local, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::ServiceError;
use crate::models::book::Entity as Book;
use crate::models::shelf_entry::{self, Entity as ShelfEntry, ShelfStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The status-dependent fields of an entry, detached from persistence so the
/// rules can be applied (and tested) as plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryFields {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rating: Option<i32>,
}

/// Caller-supplied overrides for `update_entry`. Supplied values replace the
/// stored ones *before* normalization, so status-implied constraints still win.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rating: Option<i32>,
}

/// Re-normalize the dependent fields for `status`. Idempotent.
///
/// 1. A rating only makes sense on a finished book.
/// 2. READING: missing start date becomes today, end date is cleared.
/// 3. READ: missing end date becomes today, start date untouched.
/// 4. TO_READ: both dates cleared.
/// 5. A start date after the end date is clamped down to it.
pub fn normalize(status: ShelfStatus, mut fields: EntryFields, today: NaiveDate) -> EntryFields {
    if status != ShelfStatus::Read {
        fields.rating = None;
    }

    match status {
        ShelfStatus::Reading => {
            if fields.start_date.is_none() {
                fields.start_date = Some(today);
            }
            fields.end_date = None;
        }
        ShelfStatus::Read => {
            if fields.end_date.is_none() {
                fields.end_date = Some(today);
            }
        }
        ShelfStatus::ToRead => {
            fields.start_date = None;
            fields.end_date = None;
        }
    }

    if let (Some(start), Some(end)) = (fields.start_date, fields.end_date) {
        if start > end {
            fields.start_date = Some(end);
        }
    }

    fields
}

fn parse_date(value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        ServiceError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", value))
    })
}

fn parse_stored_date(value: &Option<String>) -> Option<NaiveDate> {
    value
        .as_deref()
        .and_then(|v| NaiveDate::parse_from_str(v, DATE_FORMAT).ok())
}

fn check_rating(rating: i32) -> Result<(), ServiceError> {
    // Bounds are a constraint at the boundary, not a normalization rule:
    // out-of-range values are rejected, never clamped.
    if !(0..=100).contains(&rating) {
        return Err(ServiceError::Validation(format!(
            "rating {} out of range, expected 0-100",
            rating
        )));
    }
    Ok(())
}

fn format_date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format(DATE_FORMAT).to_string())
}

async fn find_entry<C: ConnectionTrait>(
    db: &C,
    profile_id: i32,
    book_id: i32,
) -> Result<Option<shelf_entry::Model>, ServiceError> {
    let entry = ShelfEntry::find()
        .filter(shelf_entry::Column::ProfileId.eq(profile_id))
        .filter(shelf_entry::Column::BookId.eq(book_id))
        .one(db)
        .await?;
    Ok(entry)
}

/// Add a book to a profile's shelf with an initial status. The duplicate
/// check and the insert run in one transaction, so a concurrent add of the
/// same pair reports `Conflict` rather than a raw uniqueness violation.
pub async fn add_book(
    db: &DatabaseConnection,
    profile_id: i32,
    book_id: i32,
    status: ShelfStatus,
) -> Result<shelf_entry::Model, ServiceError> {
    let txn = db.begin().await?;

    Book::find_by_id(book_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if find_entry(&txn, profile_id, book_id).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "book {} is already on the shelf",
            book_id
        )));
    }

    let fields = normalize(status, EntryFields::default(), Local::now().date_naive());
    let now = Utc::now().to_rfc3339();

    let entry = shelf_entry::ActiveModel {
        profile_id: Set(profile_id),
        book_id: Set(Some(book_id)),
        status: Set(status.as_str().to_string()),
        start_date: Set(format_date(fields.start_date)),
        end_date: Set(format_date(fields.end_date)),
        rating: Set(fields.rating),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = entry.insert(&txn).await?;
    txn.commit().await?;
    tracing::info!(
        "Shelf add: profile={} book={} status={}",
        profile_id,
        book_id,
        model.status
    );
    Ok(model)
}

/// Move an entry to a new status, re-normalizing the dependent fields.
pub async fn move_book(
    db: &DatabaseConnection,
    profile_id: i32,
    book_id: i32,
    new_status: ShelfStatus,
) -> Result<shelf_entry::Model, ServiceError> {
    let entry = find_entry(db, profile_id, book_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let fields = EntryFields {
        start_date: parse_stored_date(&entry.start_date),
        end_date: parse_stored_date(&entry.end_date),
        rating: entry.rating,
    };
    let fields = normalize(new_status, fields, Local::now().date_naive());

    let mut active: shelf_entry::ActiveModel = entry.into();
    active.status = Set(new_status.as_str().to_string());
    active.start_date = Set(format_date(fields.start_date));
    active.end_date = Set(format_date(fields.end_date));
    active.rating = Set(fields.rating);
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Edit dates/rating of an entry. Overrides are applied before normalization,
/// so a field the current status disallows is silently discarded.
pub async fn update_entry(
    db: &DatabaseConnection,
    profile_id: i32,
    book_id: i32,
    update: EntryUpdate,
) -> Result<shelf_entry::Model, ServiceError> {
    let entry = find_entry(db, profile_id, book_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if let Some(rating) = update.rating {
        check_rating(rating)?;
    }

    let status = entry.status();
    let mut fields = EntryFields {
        start_date: parse_stored_date(&entry.start_date),
        end_date: parse_stored_date(&entry.end_date),
        rating: entry.rating,
    };

    if let Some(value) = &update.start_date {
        fields.start_date = Some(parse_date(value)?);
    }
    if let Some(value) = &update.end_date {
        fields.end_date = Some(parse_date(value)?);
    }
    if let Some(rating) = update.rating {
        fields.rating = Some(rating);
    }

    let fields = normalize(status, fields, Local::now().date_naive());

    let mut active: shelf_entry::ActiveModel = entry.into();
    active.start_date = Set(format_date(fields.start_date));
    active.end_date = Set(format_date(fields.end_date));
    active.rating = Set(fields.rating);
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Remove a book from the shelf.
pub async fn remove_book(
    db: &DatabaseConnection,
    profile_id: i32,
    book_id: i32,
) -> Result<(), ServiceError> {
    let entry = find_entry(db, profile_id, book_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    entry.delete(db).await?;
    tracing::info!("Shelf remove: profile={} book={}", profile_id, book_id);
    Ok(())
}

/// List a profile's shelf, most recently updated first.
pub async fn list_shelf(
    db: &DatabaseConnection,
    profile_id: i32,
    status: Option<ShelfStatus>,
) -> Result<Vec<shelf_entry::Model>, ServiceError> {
    let mut query = ShelfEntry::find().filter(shelf_entry::Column::ProfileId.eq(profile_id));

    if let Some(status) = status {
        query = query.filter(shelf_entry::Column::Status.eq(status.as_str()));
    }

    let entries = query
        .order_by_desc(shelf_entry::Column::UpdatedAt)
        .all(db)
        .await?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn reading_gets_start_date_and_loses_end_date() {
        let fields = EntryFields {
            end_date: Some(date("2024-03-01")),
            rating: Some(80),
            ..Default::default()
        };
        let out = normalize(ShelfStatus::Reading, fields, date("2024-05-10"));
        assert_eq!(out.start_date, Some(date("2024-05-10")));
        assert_eq!(out.end_date, None);
        assert_eq!(out.rating, None);
    }

    #[test]
    fn read_fills_missing_end_date_only() {
        let fields = EntryFields {
            start_date: Some(date("2024-01-01")),
            ..Default::default()
        };
        let out = normalize(ShelfStatus::Read, fields, date("2024-05-10"));
        assert_eq!(out.start_date, Some(date("2024-01-01")));
        assert_eq!(out.end_date, Some(date("2024-05-10")));
    }

    #[test]
    fn to_read_clears_everything() {
        let fields = EntryFields {
            start_date: Some(date("2024-01-01")),
            end_date: Some(date("2024-02-01")),
            rating: Some(55),
        };
        let out = normalize(ShelfStatus::ToRead, fields, date("2024-05-10"));
        assert_eq!(out, EntryFields::default());
    }

    #[test]
    fn start_after_end_is_clamped() {
        let fields = EntryFields {
            start_date: Some(date("2024-06-01")),
            end_date: Some(date("2024-01-01")),
            ..Default::default()
        };
        let out = normalize(ShelfStatus::Read, fields, date("2024-05-10"));
        assert_eq!(out.start_date, Some(date("2024-01-01")));
        assert_eq!(out.end_date, Some(date("2024-01-01")));
    }

    #[test]
    fn normalize_is_idempotent() {
        let today = date("2024-05-10");
        for status in [ShelfStatus::ToRead, ShelfStatus::Reading, ShelfStatus::Read] {
            let fields = EntryFields {
                start_date: Some(date("2024-06-01")),
                end_date: Some(date("2024-01-01")),
                rating: Some(42),
            };
            let once = normalize(status, fields, today);
            let twice = normalize(status, once, today);
            assert_eq!(once, twice, "status {:?}", status);
        }
    }

    #[test]
    fn rating_bounds_are_rejected_not_clamped() {
        assert!(check_rating(0).is_ok());
        assert!(check_rating(100).is_ok());
        assert!(check_rating(-1).is_err());
        assert!(check_rating(101).is_err());
    }
}
